use std::thread::sleep;
use std::time::Duration;
use tracing::debug;

use crate::error::Result;
use crate::generator;
use crate::mapper::predefined_dtos;
use crate::types::{GeneratedNumbersDto, LotteryTypeDto};

pub const SIMULATED_DELAY: Duration = Duration::from_millis(800);

/// Local stand-in for a remote lottery service. It only simulates latency;
/// the numbers come from [`generator`]. Calls block, so run them on the
/// blocking pool.
#[derive(Debug, Clone)]
pub struct StubbedLotteryApi {
    delay: Duration,
}

impl Default for StubbedLotteryApi {
    fn default() -> Self {
        Self::new(SIMULATED_DELAY)
    }
}

impl StubbedLotteryApi {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn generate_numbers(&self, lottery_type: &LotteryTypeDto) -> Result<GeneratedNumbersDto> {
        sleep(self.delay);
        let generated = generator::generate(lottery_type)?;
        debug!(
            "generated {} for {}",
            generated.id, generated.lottery_type.id
        );
        Ok(generated)
    }

    pub fn get_lottery_types(&self) -> Result<Vec<LotteryTypeDto>> {
        sleep(self.delay / 2);
        Ok(predefined_dtos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::to_dto;
    use crate::model::LotteryTypes;
    use std::time::Instant;

    #[test]
    fn returns_all_predefined_types() {
        let api = StubbedLotteryApi::new(Duration::ZERO);
        let types = api.get_lottery_types().unwrap();
        assert_eq!(types.len(), 8);
        assert_eq!(types[0].id, "powerball");
        assert!(types.iter().all(|t| !t.is_custom));
    }

    #[test]
    fn waits_before_answering() {
        let api = StubbedLotteryApi::new(Duration::from_millis(30));
        let started = Instant::now();
        api.generate_numbers(&to_dto(&LotteryTypes::pick_3())).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
