mod atlas;
mod meta;
mod output;
mod padding;
mod plan;
mod raster;
mod scan;
mod size;

#[cfg(test)]
mod testing;

pub use crate::{
    atlas::{make, Error, Parameters, SheetSummary, Summary},
    meta::{Map, Sheet},
    padding::{Fill, Layout, Padding, TooLarge},
    plan::{plan, Plan},
    size::{Position, Size},
};
