/// Analysis modules: post-scan filtering and ordering of the flat path list.

pub mod categories;
pub mod recent;

pub use categories::{
    categorise_extension, categorise_path, category_counts, filter_by_category, MediaCategory,
};
pub use recent::sort_by_recent;
