pub mod asset_class_service;
pub mod constituent_service;
pub mod exposure_service;
pub mod holdings_service;
pub mod report_service;
pub mod resolution;
pub mod sector_breakdown_service;
pub mod sector_service;
pub mod translation_service;
