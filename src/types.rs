use serde::{Deserialize, Serialize};

/// Format as it crosses the (stand-in) API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryTypeDto {
    pub id: String,
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "mainNumberCount")]
    pub main_number_count: u32,
    #[serde(rename = "mainNumberMax")]
    pub main_number_max: u32,
    #[serde(rename = "bonusNumberCount")]
    pub bonus_number_count: u32,
    #[serde(rename = "bonusNumberMax")]
    pub bonus_number_max: u32,
    #[serde(rename = "isCustom", default)]
    pub is_custom: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedNumbersDto {
    pub id: String,
    #[serde(rename = "lotteryType")]
    pub lottery_type: LotteryTypeDto,
    #[serde(rename = "mainNumbers")]
    pub main_numbers: Vec<u32>,
    #[serde(rename = "bonusNumbers")]
    pub bonus_numbers: Vec<u32>,
    pub timestamp: i64,
}

/// Row of `history_entries`. Numbers are stored comma separated, and the
/// format is denormalized so rows survive formats that are later removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntryEntity {
    pub id: String,
    pub lottery_type_id: String,
    pub lottery_type_name: String,
    pub lottery_type_main_number_count: u32,
    pub lottery_type_main_number_max: u32,
    pub lottery_type_bonus_number_count: u32,
    pub lottery_type_bonus_number_max: u32,
    pub is_custom_lottery_type: bool,
    pub main_numbers: String,
    pub bonus_numbers: String,
    pub timestamp: i64,
}

/// Row of `custom_lottery_types`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomLotteryTypeEntity {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub main_number_count: u32,
    pub main_number_max: u32,
    pub bonus_number_count: u32,
    pub bonus_number_max: u32,
    pub created_at: i64,
    pub updated_at: i64,
}
