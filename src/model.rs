use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A lottery game's parameters: how many numbers, from what range, and
/// whether a separately ranged bonus group is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryType {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub main_number_count: u32,
    pub main_number_max: u32,
    pub bonus_number_count: u32,
    pub bonus_number_max: u32,
    #[serde(default)]
    pub is_custom: bool,
}

impl LotteryType {
    pub fn has_bonus_numbers(&self) -> bool {
        self.bonus_number_count > 0
    }

    /// Pick games draw digits with replacement, starting from zero, and keep
    /// the draw order.
    pub fn is_pick_game(&self) -> bool {
        self.id.starts_with(PICK_GAME_PREFIX)
    }

    pub fn description(&self) -> String {
        if self.has_bonus_numbers() {
            format!(
                "{} numbers (1-{}) + {} bonus (1-{})",
                self.main_number_count,
                self.main_number_max,
                self.bonus_number_count,
                self.bonus_number_max
            )
        } else {
            format!(
                "{} numbers (1-{})",
                self.main_number_count, self.main_number_max
            )
        }
    }
}

pub const PICK_GAME_PREFIX: &str = "pick_";

struct Predefined {
    id: &'static str,
    name: &'static str,
    display_name: &'static str,
    main: (u32, u32),
    bonus: (u32, u32),
}

impl Predefined {
    fn to_lottery_type(&self) -> LotteryType {
        LotteryType {
            id: self.id.to_string(),
            name: self.name.to_string(),
            display_name: self.display_name.to_string(),
            main_number_count: self.main.0,
            main_number_max: self.main.1,
            bonus_number_count: self.bonus.0,
            bonus_number_max: self.bonus.1,
            is_custom: false,
        }
    }
}

// Display order of the built-in games.
const PREDEFINED: [Predefined; 8] = [
    Predefined {
        id: "powerball",
        name: "Powerball",
        display_name: "Powerball",
        main: (5, 69),
        bonus: (1, 26),
    },
    Predefined {
        id: "mega_millions",
        name: "Mega Millions",
        display_name: "Mega Millions",
        main: (5, 70),
        bonus: (1, 25),
    },
    Predefined {
        id: "cash4life",
        name: "Cash4Life",
        display_name: "Cash4Life",
        main: (5, 60),
        bonus: (1, 4),
    },
    Predefined {
        id: "lucky_for_life",
        name: "Lucky for Life",
        display_name: "Lucky for Life",
        main: (5, 48),
        bonus: (1, 18),
    },
    Predefined {
        id: "lotto_america",
        name: "Lotto America",
        display_name: "Lotto America",
        main: (5, 52),
        bonus: (1, 10),
    },
    Predefined {
        id: "lotto_6_49",
        name: "Lotto 6/49",
        display_name: "Classic 6/49",
        main: (6, 49),
        bonus: (0, 0),
    },
    Predefined {
        id: "pick_3",
        name: "Pick 3",
        display_name: "Pick 3",
        main: (3, 9),
        bonus: (0, 0),
    },
    Predefined {
        id: "pick_4",
        name: "Pick 4",
        display_name: "Pick 4",
        main: (4, 9),
        bonus: (0, 0),
    },
];

/// The built-in lottery games. These are compiled in and never stored.
pub struct LotteryTypes;

impl LotteryTypes {
    pub fn all() -> Vec<LotteryType> {
        PREDEFINED.iter().map(Predefined::to_lottery_type).collect()
    }

    pub fn find_by_id(id: &str) -> Option<LotteryType> {
        PREDEFINED
            .iter()
            .find(|p| p.id == id)
            .map(Predefined::to_lottery_type)
    }

    pub fn powerball() -> LotteryType {
        PREDEFINED[0].to_lottery_type()
    }

    pub fn mega_millions() -> LotteryType {
        PREDEFINED[1].to_lottery_type()
    }

    pub fn cash4life() -> LotteryType {
        PREDEFINED[2].to_lottery_type()
    }

    pub fn lucky_for_life() -> LotteryType {
        PREDEFINED[3].to_lottery_type()
    }

    pub fn lotto_america() -> LotteryType {
        PREDEFINED[4].to_lottery_type()
    }

    pub fn lotto_6_49() -> LotteryType {
        PREDEFINED[5].to_lottery_type()
    }

    pub fn pick_3() -> LotteryType {
        PREDEFINED[6].to_lottery_type()
    }

    pub fn pick_4() -> LotteryType {
        PREDEFINED[7].to_lottery_type()
    }
}

/// One completed generation: a snapshot of the format plus the numbers drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedNumbers {
    pub id: String,
    pub lottery_type: LotteryType,
    pub main_numbers: Vec<u32>,
    pub bonus_numbers: Vec<u32>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl GeneratedNumbers {
    pub fn has_bonus_numbers(&self) -> bool {
        !self.bonus_numbers.is_empty()
    }

    pub fn main_numbers_formatted(&self) -> String {
        join_numbers(&self.main_numbers)
    }

    pub fn bonus_numbers_formatted(&self) -> String {
        join_numbers(&self.bonus_numbers)
    }

    pub fn formatted_date(&self) -> String {
        DateTime::from_timestamp_millis(self.timestamp)
            .map(|utc| {
                utc.with_timezone(&Local)
                    .format("%b %d, %Y %H:%M")
                    .to_string()
            })
            .unwrap_or_default()
    }
}

fn join_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" - ")
}
