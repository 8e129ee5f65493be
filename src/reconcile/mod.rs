pub mod albums;
pub mod asset;

pub use albums::{AlbumChange, AlbumLinker, AlbumOutcome, LinkMode};
pub use asset::{AssetAction, AssetOutcome, AssetReconciler, Plan};
