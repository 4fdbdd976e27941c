//! URL handling module for Gleaner
//!
//! Pure, stateless helpers shared by the skip policy, the frontier, and the
//! extraction pipeline: domain/filename/extension derivation, query
//! stripping, keyword normalization, slugification, deterministic UIDs, and
//! the sentence heuristic used as a title fallback.

mod keywords;
mod parts;
mod sentence;
mod uid;

pub use keywords::{keywordify, keywordify_all, slugify};
pub use parts::{
    domain_of, extension_of, filename_of, is_file_extension, is_file_url, language_of,
    remove_query, FILE_EXTENSIONS, IMAGE_EXTENSIONS,
};
pub use sentence::{collapse_whitespace, find_sentence};
pub use uid::stable_uid;
