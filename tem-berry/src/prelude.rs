//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Pos2d};

pub use crate::acquire::{fetch_verified, home_dataset_dir_with, FetchSpec, HashPolicy};

pub use crate::bundle::{OpticsMeta, SignalBundle, SignalEntry};

pub use crate::localize::{locate_columns, positions_to_array, PeakConfig};

pub use crate::feature::{neighbor_features, FeatureConfig, KdTree2, FEATURE_DIM};

pub use crate::cluster::{
    partition_by_vertices, select_features, take_rows, ClusterModel, KMeans, MinMaxScaler,
    Partition,
};

pub use crate::segment::{propagate_labels, SegmentMap};

pub use crate::consts::{
    DEFAULT_CLUSTER_COUNT, DEFAULT_FEATURE_SUBSET, DEFAULT_MAX_NEIGHBOR_DISTANCE,
    DEFAULT_NEIGHBOR_CAP, DEFAULT_PEAK_SEPARATION, MIN_INTERIOR_VERTICES,
};
