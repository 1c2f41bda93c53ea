pub mod aggregate;
pub mod canonical;
pub mod champion_stats;
pub mod report;
pub mod subset;
