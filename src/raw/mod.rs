mod arena;
mod delete;
mod handle;
mod insert;
mod node;
mod raw_bplus_tree;
mod validate;

pub(crate) use handle::Handle;
pub(crate) use raw_bplus_tree::RawBPlusTree;
