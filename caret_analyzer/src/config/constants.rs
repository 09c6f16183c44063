//! Compile-time limits for the caret analyzer
//!
//! These bounds protect the recursive parsers and the logging buffers from
//! hostile or runaway input. They are not user preferences and cannot be
//! changed at runtime.

pub mod compile_time {
    pub mod lexical {
        /// Maximum identifier length (512 characters)
        /// SECURITY: Prevents scanner complexity attacks
        pub const MAX_IDENTIFIER_LENGTH: usize = 512;

        /// Maximum string literal size (1MB)
        /// SECURITY: Prevents DoS attacks via enormous string literals
        pub const MAX_STRING_SIZE: usize = 1_048_576;

        /// Maximum expression text accepted for analysis (1MB)
        /// SECURITY: Bounds the work done per keystroke
        pub const MAX_SOURCE_LENGTH: usize = 1_048_576;
    }

    pub mod syntax {
        /// Maximum parser recursion depth to prevent stack overflow
        /// SECURITY: Prevents DoS attacks via deeply nested expressions
        pub const MAX_PARSE_DEPTH: usize = 100;
    }

    pub mod compilation {
        /// Maximum base-type chain walked during member lookup
        /// SECURITY: Guards against cyclic type models
        pub const MAX_INHERITANCE_DEPTH: usize = 64;

        /// Maximum nesting of lambda scopes inside sequence operators
        pub const MAX_SCOPE_DEPTH: usize = 32;
    }

    pub mod logging {
        /// Maximum events retained by in-memory loggers
        /// RESOURCE: Controls memory usage for event collection
        pub const LOG_BUFFER_SIZE: usize = 10_000;

        /// Maximum log message length before truncation
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 4096;

        /// Maximum context entries attached to one event
        pub const MAX_CONTEXT_ENTRIES: usize = 32;
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time::*;

    #[test]
    fn test_limits_are_sane() {
        assert!(lexical::MAX_IDENTIFIER_LENGTH > 0);
        assert!(lexical::MAX_STRING_SIZE <= lexical::MAX_SOURCE_LENGTH);
        assert!(syntax::MAX_PARSE_DEPTH >= 16);
        assert!(compilation::MAX_SCOPE_DEPTH <= syntax::MAX_PARSE_DEPTH);
        assert!(logging::LOG_BUFFER_SIZE >= 100);
    }
}
