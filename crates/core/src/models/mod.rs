pub mod allocation;
pub mod cache;
pub mod etf;
pub mod exposure;
pub mod holding;
pub mod mutual_fund;
pub mod sector;
pub mod settings;
