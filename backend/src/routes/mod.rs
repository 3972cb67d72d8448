pub mod analytics;
pub mod inventory;
pub mod matching;
pub mod prediction;

#[cfg(test)]
mod tests {
    #[test]
    fn test_route_paths() {
        assert_eq!(super::prediction::PREDICT_SHORTAGE, "/predict/shortage");
        assert_eq!(super::prediction::PREDICT_RISKS, "/predict/risks");
        assert_eq!(super::matching::MATCH_EMERGENCY, "/match/emergency");
        assert_eq!(super::matching::MATCH_DONORS, "/match/donors");
        assert_eq!(super::analytics::ANALYTICS_WASTE, "/analytics/waste");
        assert_eq!(super::analytics::ANALYTICS_FORECAST, "/analytics/forecast");
        assert_eq!(super::analytics::ANALYTICS_HEATMAP, "/analytics/heatmap");
        assert_eq!(super::inventory::INVENTORY, "/inventory");
        assert_eq!(super::inventory::INVENTORY_UPDATE, "/inventory/update");
        assert_eq!(super::inventory::API_PREFIX, "/api/v1");
    }
}
