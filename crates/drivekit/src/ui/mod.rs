mod tracker;

pub use tracker::UploadTracker;
