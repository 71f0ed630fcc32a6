//! Integration tests for the streaming rewriters, driven through the
//! public library API against real files.

mod atomic_commit;
mod comment_neutralize;
mod marker_numbering;
mod properties;
mod two_pass;
