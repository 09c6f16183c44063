//! Token system for expression text
//!
//! - **[`TokenId`]** - closed set of token kinds, one per operator symbol
//! - **[`Token`]** - kind, raw text and byte offset
//! - **[`TokenStream`]** - lazy cursor with clone-based lookahead
//!
//! Word operators (`and`, `or`, `not`, `mod`, `eq`, `ne`, `neq`, `lt`, `le`,
//! `gt`, `ge`) are mapped onto symbol ids case-insensitively, except directly
//! after a `.` where they remain member names.

pub mod token;
pub mod token_stream;

pub use token::{classify_operator_word, Token, TokenId};
pub use token_stream::TokenStream;
