mod merger;
mod store;

pub use {
    merger::{ByteConcatMerger, ContainerMerger},
    store::SegmentStore,
};
