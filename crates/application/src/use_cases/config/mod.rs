mod load;
mod reload;

pub use load::LoadConfigUseCase;
pub use reload::ReloadConfigUseCase;
