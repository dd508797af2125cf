use crate::ship::ShipKind;

pub const BOARD_SIZE: u8 = 10;
/// Maximum number of ships a single grid may hold.
pub const MAX_FLEET_SIZE: usize = 5;
pub const STANDARD_FLEET: [ShipKind; MAX_FLEET_SIZE] = ShipKind::ALL;

/// Total number of ship segments in the standard fleet.
pub const TOTAL_SHIP_CELLS: usize = 5 + 4 + 3 + 3 + 2;

/// Attempts per ship before random placement gives up.
pub const PLACEMENT_ATTEMPTS: usize = 100;

/// Active games idle at least this long are reported as dormant.
pub const DEFAULT_DORMANT_HOURS: i64 = 12;

/// Display name used wherever the automated opponent needs one.
pub const AUTOMATED_PLAYER_NAME: &str = "Computer";

/// Sampling temperature for the automated opponent's targeting.
pub const TARGETING_TEMPERATURE: f64 = 0.5;

const _: () = assert!((BOARD_SIZE as usize) * (BOARD_SIZE as usize) <= 128);

/// Runtime settings for [`crate::BattleshipService`].
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Idle time after which an Active game counts as dormant.
    pub dormant_after: chrono::TimeDelta,
    /// Fixed seed for random fleets and automated targeting. `None` seeds
    /// from the thread RNG.
    pub seed: Option<u64>,
}

#[cfg(feature = "std")]
impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            dormant_after: chrono::TimeDelta::hours(DEFAULT_DORMANT_HOURS),
            seed: None,
        }
    }
}

#[cfg(feature = "std")]
impl ServiceConfig {
    /// Read overrides from `BATTLESHIP_DORMANT_HOURS` and `BATTLESHIP_SEED`.
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(hours) = std::env::var("BATTLESHIP_DORMANT_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(chrono::TimeDelta::try_hours)
        {
            config.dormant_after = hours;
        }
        config.seed = std::env::var("BATTLESHIP_SEED")
            .ok()
            .and_then(|v| v.parse().ok());
        config
    }
}
