use chrono::Utc;
use rand::Rng;
use rand::seq::index;
use uuid::Uuid;

use crate::error::{LottoError, Result};
use crate::types::{GeneratedNumbersDto, LotteryTypeDto};

/// Draws one set of numbers for `lottery_type` using the thread-local RNG.
pub fn generate(lottery_type: &LotteryTypeDto) -> Result<GeneratedNumbersDto> {
    generate_with(
        &mut rand::thread_rng(),
        lottery_type,
        Utc::now().timestamp_millis(),
    )
}

pub fn generate_with<R: Rng + ?Sized>(
    rng: &mut R,
    lottery_type: &LotteryTypeDto,
    timestamp: i64,
) -> Result<GeneratedNumbersDto> {
    let is_pick_game = lottery_type
        .id
        .starts_with(crate::model::PICK_GAME_PREFIX);

    let main_numbers = if is_pick_game {
        generate_pick_numbers(
            rng,
            lottery_type.main_number_count,
            lottery_type.main_number_max,
        )
    } else {
        let mut numbers = generate_unique_numbers(
            rng,
            lottery_type.main_number_count,
            lottery_type.main_number_max,
        )?;
        numbers.sort_unstable();
        numbers
    };

    let bonus_numbers = if lottery_type.bonus_number_count > 0 {
        let mut numbers = generate_unique_numbers(
            rng,
            lottery_type.bonus_number_count,
            lottery_type.bonus_number_max,
        )?;
        numbers.sort_unstable();
        numbers
    } else {
        Vec::new()
    };

    Ok(GeneratedNumbersDto {
        id: Uuid::new_v4().to_string(),
        lottery_type: lottery_type.clone(),
        main_numbers,
        bonus_numbers,
        timestamp,
    })
}

/// `count` distinct numbers from `1..=max`, in draw order.
pub fn generate_unique_numbers<R: Rng + ?Sized>(
    rng: &mut R,
    count: u32,
    max: u32,
) -> Result<Vec<u32>> {
    if count > max {
        return Err(LottoError::Generation(format!(
            "Cannot generate {} unique numbers from 1 to {}",
            count, max
        )));
    }

    Ok(index::sample(rng, max as usize, count as usize)
        .into_iter()
        .map(|i| i as u32 + 1)
        .collect())
}

/// `count` independent digits from `0..=max`. Repeats allowed, order kept.
pub fn generate_pick_numbers<R: Rng + ?Sized>(rng: &mut R, count: u32, max: u32) -> Vec<u32> {
    (0..count).map(|_| rng.gen_range(0..=max)).collect()
}
