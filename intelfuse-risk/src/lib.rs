pub mod factors;
pub mod profile;
pub mod scoring;

pub use factors::RiskFactors;
pub use profile::{
    AssetRiskProfile, AssetRiskSummary, OrganizationRisk, RiskDistribution, asset_risk_profile,
    organization_risk,
};
pub use scoring::{Priority, RiskAssessment, risk_score};
