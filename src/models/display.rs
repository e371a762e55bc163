use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::enums::{ChartType, DefinitionCategory, TrendDirection};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTrend {
    pub direction: TrendDirection,
    pub percentage: f64,
}

/// A metric card produced by the report generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDefinition {
    #[serde(default)]
    pub id: String,
    pub label: String,
    pub value: Value,
    pub trend: Option<MetricTrend>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub icon: Option<String>,
    /// Explicit semantic tag. Takes precedence over label inference.
    pub category: Option<DefinitionCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub name: String,
    pub value: f64,
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub axis_type: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDefinition {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub data: Vec<ChartDataPoint>,
    pub x_axis: Option<AxisConfig>,
    pub y_axis: Option<AxisConfig>,
    pub description: Option<String>,
    pub category: Option<DefinitionCategory>,
}

/// Metric and chart definitions of one report, as rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardDefinitions {
    pub metrics: Vec<MetricDefinition>,
    pub charts: Vec<ChartDefinition>,
}
