mod store;

pub use store::ArcSwapGenerationStore;
