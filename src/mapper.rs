//! Conversions between the domain model, the DTOs and the stored rows.

use tracing::warn;

use crate::model::{GeneratedNumbers, LotteryType, LotteryTypes};
use crate::types::{
    CustomLotteryTypeEntity, GeneratedNumbersDto, HistoryEntryEntity, LotteryTypeDto,
};

pub const NUMBER_SEPARATOR: &str = ",";

pub fn to_dto(lottery_type: &LotteryType) -> LotteryTypeDto {
    LotteryTypeDto {
        id: lottery_type.id.clone(),
        name: lottery_type.name.clone(),
        display_name: lottery_type.display_name.clone(),
        main_number_count: lottery_type.main_number_count,
        main_number_max: lottery_type.main_number_max,
        bonus_number_count: lottery_type.bonus_number_count,
        bonus_number_max: lottery_type.bonus_number_max,
        is_custom: lottery_type.is_custom,
    }
}

pub fn to_domain(dto: &LotteryTypeDto) -> LotteryType {
    LotteryType {
        id: dto.id.clone(),
        name: dto.name.clone(),
        display_name: dto.display_name.clone(),
        main_number_count: dto.main_number_count,
        main_number_max: dto.main_number_max,
        bonus_number_count: dto.bonus_number_count,
        bonus_number_max: dto.bonus_number_max,
        is_custom: dto.is_custom,
    }
}

pub fn generated_to_domain(dto: GeneratedNumbersDto) -> GeneratedNumbers {
    GeneratedNumbers {
        id: dto.id,
        lottery_type: to_domain(&dto.lottery_type),
        main_numbers: dto.main_numbers,
        bonus_numbers: dto.bonus_numbers,
        timestamp: dto.timestamp,
    }
}

pub fn predefined_dtos() -> Vec<LotteryTypeDto> {
    LotteryTypes::all().iter().map(to_dto).collect()
}

pub fn to_history_entity(dto: &GeneratedNumbersDto) -> HistoryEntryEntity {
    let lottery_type = &dto.lottery_type;
    HistoryEntryEntity {
        id: dto.id.clone(),
        lottery_type_id: lottery_type.id.clone(),
        lottery_type_name: lottery_type.display_name.clone(),
        lottery_type_main_number_count: lottery_type.main_number_count,
        lottery_type_main_number_max: lottery_type.main_number_max,
        lottery_type_bonus_number_count: lottery_type.bonus_number_count,
        lottery_type_bonus_number_max: lottery_type.bonus_number_max,
        is_custom_lottery_type: lottery_type.is_custom,
        main_numbers: encode_numbers(&dto.main_numbers),
        bonus_numbers: encode_numbers(&dto.bonus_numbers),
        timestamp: dto.timestamp,
    }
}

/// Rebuilds a result from its row. A predefined format is resolved by id;
/// anything else comes from the snapshot columns stored with the row.
pub fn history_entity_to_dto(entity: &HistoryEntryEntity) -> GeneratedNumbersDto {
    let lottery_type = LotteryTypes::find_by_id(&entity.lottery_type_id)
        .map(|t| to_dto(&t))
        .unwrap_or_else(|| {
            if !entity.is_custom_lottery_type {
                warn!(
                    "Unknown lottery type ID: {}, using stored snapshot",
                    entity.lottery_type_id
                );
            }
            LotteryTypeDto {
                id: entity.lottery_type_id.clone(),
                name: entity.lottery_type_name.clone(),
                display_name: entity.lottery_type_name.clone(),
                main_number_count: entity.lottery_type_main_number_count,
                main_number_max: entity.lottery_type_main_number_max,
                bonus_number_count: entity.lottery_type_bonus_number_count,
                bonus_number_max: entity.lottery_type_bonus_number_max,
                is_custom: entity.is_custom_lottery_type,
            }
        });

    GeneratedNumbersDto {
        id: entity.id.clone(),
        lottery_type,
        main_numbers: parse_numbers(&entity.main_numbers, "main_numbers", &entity.id),
        bonus_numbers: parse_numbers(&entity.bonus_numbers, "bonus_numbers", &entity.id),
        timestamp: entity.timestamp,
    }
}

pub fn history_entity_to_domain(entity: &HistoryEntryEntity) -> GeneratedNumbers {
    generated_to_domain(history_entity_to_dto(entity))
}

pub fn custom_entity_to_domain(entity: &CustomLotteryTypeEntity) -> LotteryType {
    LotteryType {
        id: entity.id.clone(),
        name: entity.name.clone(),
        display_name: entity.display_name.clone(),
        main_number_count: entity.main_number_count,
        main_number_max: entity.main_number_max,
        bonus_number_count: entity.bonus_number_count,
        bonus_number_max: entity.bonus_number_max,
        is_custom: true,
    }
}

pub fn custom_entity_to_dto(entity: &CustomLotteryTypeEntity) -> LotteryTypeDto {
    to_dto(&custom_entity_to_domain(entity))
}

pub fn to_custom_entity(
    lottery_type: &LotteryType,
    created_at: i64,
    updated_at: i64,
) -> CustomLotteryTypeEntity {
    CustomLotteryTypeEntity {
        id: lottery_type.id.clone(),
        name: lottery_type.name.clone(),
        display_name: lottery_type.display_name.clone(),
        main_number_count: lottery_type.main_number_count,
        main_number_max: lottery_type.main_number_max,
        bonus_number_count: lottery_type.bonus_number_count,
        bonus_number_max: lottery_type.bonus_number_max,
        created_at,
        updated_at,
    }
}

pub fn encode_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(NUMBER_SEPARATOR)
}

/// Parses a comma separated list, skipping blank segments. Segments that are
/// not numbers are logged and dropped, so a damaged row reads back shorter
/// instead of failing.
pub fn parse_numbers(numbers: &str, field_name: &str, entry_id: &str) -> Vec<u32> {
    if numbers.trim().is_empty() {
        return Vec::new();
    }

    numbers
        .split(NUMBER_SEPARATOR)
        .filter(|segment| !segment.trim().is_empty())
        .filter_map(|segment| match segment.trim().parse::<u32>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(
                    "Failed to parse {} value '{}' for entry {}",
                    field_name, segment, entry_id
                );
                None
            }
        })
        .collect()
}
