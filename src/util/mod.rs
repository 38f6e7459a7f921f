pub mod asset_loader;
pub mod format;
pub mod validation;
