//! profile::options: validated profiling configuration.
//!
//! Purpose
//! -------
//! Configure step sizes, stopping rules, and extrapolation settings of the
//! profile walk. Values are validated once at construction so the walking
//! code can rely on them.
//!
//! Defaults
//! --------
//! | option                   | default |
//! |--------------------------|---------|
//! | `default_step_size`      | 0.01    |
//! | `min_step_size`          | 0.001   |
//! | `max_step_size`          | 1.0     |
//! | `step_size_factor`       | 1.25    |
//! | `delta_ratio_max`        | 0.1     |
//! | `ratio_min`              | 0.145   |
//! | `reg_points`             | 10      |
//! | `reg_order`              | 4       |
//! | `whole_path`             | false   |
//! | `magic_factor_obj_value` | 0.5     |
//! | `max_walk_steps`         | 10 000  |
//! | `max_tries`              | 10      |
use crate::profile::errors::{ProfilingError, ProfilingResult};
use serde::{Deserialize, Serialize};

/// Profiling options. Build through [`ProfileOptions::builder`] or use
/// [`ProfileOptions::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileOptions {
    /// Initial step of the profiled parameter.
    pub default_step_size: f64,
    pub min_step_size: f64,
    pub max_step_size: f64,
    /// Multiplicative step adaptation factor.
    pub step_size_factor: f64,
    /// Largest accepted relative change of the likelihood ratio per step.
    pub delta_ratio_max: f64,
    /// The walk stops below this likelihood ratio.
    pub ratio_min: f64,
    /// Number of trailing points used by the regression proposal.
    pub reg_points: usize,
    /// Maximal polynomial degree of the regression proposal.
    pub reg_order: usize,
    /// Walk until both bounds are reached, ignoring `ratio_min`.
    pub whole_path: bool,
    /// Damping of the objective target by the distance to the optimum.
    pub magic_factor_obj_value: f64,
    /// Step cap per direction.
    pub max_walk_steps: usize,
    /// Retry budget for a failing step.
    pub max_tries: usize,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            default_step_size: 0.01,
            min_step_size: 0.001,
            max_step_size: 1.0,
            step_size_factor: 1.25,
            delta_ratio_max: 0.1,
            ratio_min: 0.145,
            reg_points: 10,
            reg_order: 4,
            whole_path: false,
            magic_factor_obj_value: 0.5,
            max_walk_steps: 10_000,
            max_tries: 10,
        }
    }
}

impl ProfileOptions {
    pub fn builder() -> ProfileOptionsBuilder {
        ProfileOptionsBuilder { options: ProfileOptions::default() }
    }

    /// Check every constraint.
    ///
    /// # Errors
    /// [`ProfilingError::InvalidOption`] naming the first violated option.
    pub fn validate(&self) -> ProfilingResult<()> {
        let floats = [
            ("default_step_size", self.default_step_size),
            ("min_step_size", self.min_step_size),
            ("max_step_size", self.max_step_size),
            ("step_size_factor", self.step_size_factor),
            ("delta_ratio_max", self.delta_ratio_max),
            ("ratio_min", self.ratio_min),
            ("magic_factor_obj_value", self.magic_factor_obj_value),
        ];
        for (name, value) in floats {
            if !value.is_finite() {
                return Err(invalid(name, value, "must be finite"));
            }
        }
        if self.min_step_size <= 0.0 {
            return Err(invalid("min_step_size", self.min_step_size, "must be positive"));
        }
        if self.default_step_size < self.min_step_size {
            return Err(invalid(
                "default_step_size",
                self.default_step_size,
                "must not be smaller than min_step_size",
            ));
        }
        if self.max_step_size < self.default_step_size {
            return Err(invalid(
                "max_step_size",
                self.max_step_size,
                "must not be smaller than default_step_size",
            ));
        }
        if self.step_size_factor <= 1.0 {
            return Err(invalid("step_size_factor", self.step_size_factor, "must exceed 1"));
        }
        if self.delta_ratio_max <= 0.0 || self.delta_ratio_max >= 1.0 {
            return Err(invalid("delta_ratio_max", self.delta_ratio_max, "must lie in (0, 1)"));
        }
        if self.ratio_min <= 0.0 || self.ratio_min >= 1.0 {
            return Err(invalid("ratio_min", self.ratio_min, "must lie in (0, 1)"));
        }
        if self.magic_factor_obj_value < 0.0 || self.magic_factor_obj_value >= 1.0 {
            return Err(invalid(
                "magic_factor_obj_value",
                self.magic_factor_obj_value,
                "must lie in [0, 1)",
            ));
        }
        if self.reg_points < 2 {
            return Err(invalid("reg_points", self.reg_points as f64, "must be at least 2"));
        }
        if self.reg_order < 1 {
            return Err(invalid("reg_order", self.reg_order as f64, "must be at least 1"));
        }
        if self.max_walk_steps == 0 {
            return Err(invalid("max_walk_steps", 0.0, "must be positive"));
        }
        if self.max_tries == 0 {
            return Err(invalid("max_tries", 0.0, "must be positive"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, value: f64, reason: &'static str) -> ProfilingError {
    ProfilingError::InvalidOption { name, value, reason }
}

/// Builder for [`ProfileOptions`]; unset fields keep their defaults.
#[derive(Debug, Clone)]
pub struct ProfileOptionsBuilder {
    options: ProfileOptions,
}

impl ProfileOptionsBuilder {
    pub fn default_step_size(mut self, value: f64) -> Self {
        self.options.default_step_size = value;
        self
    }

    pub fn min_step_size(mut self, value: f64) -> Self {
        self.options.min_step_size = value;
        self
    }

    pub fn max_step_size(mut self, value: f64) -> Self {
        self.options.max_step_size = value;
        self
    }

    pub fn step_size_factor(mut self, value: f64) -> Self {
        self.options.step_size_factor = value;
        self
    }

    pub fn delta_ratio_max(mut self, value: f64) -> Self {
        self.options.delta_ratio_max = value;
        self
    }

    pub fn ratio_min(mut self, value: f64) -> Self {
        self.options.ratio_min = value;
        self
    }

    pub fn reg_points(mut self, value: usize) -> Self {
        self.options.reg_points = value;
        self
    }

    pub fn reg_order(mut self, value: usize) -> Self {
        self.options.reg_order = value;
        self
    }

    pub fn whole_path(mut self, value: bool) -> Self {
        self.options.whole_path = value;
        self
    }

    pub fn magic_factor_obj_value(mut self, value: f64) -> Self {
        self.options.magic_factor_obj_value = value;
        self
    }

    pub fn max_walk_steps(mut self, value: usize) -> Self {
        self.options.max_walk_steps = value;
        self
    }

    pub fn max_tries(mut self, value: usize) -> Self {
        self.options.max_tries = value;
        self
    }

    /// Validate and return the options.
    pub fn build(self) -> ProfilingResult<ProfileOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the defaults and the step-size ordering rules.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Defaults are valid and the builder keeps unset fields.
    //
    // Given
    // -----
    // - `ProfileOptions::default()` and a builder changing two fields.
    //
    // Expect
    // ------
    // - Both validate; untouched fields equal the defaults.
    fn defaults_are_valid_and_builder_keeps_them() {
        assert!(ProfileOptions::default().validate().is_ok());

        let opts = ProfileOptions::builder()
            .default_step_size(0.02)
            .whole_path(true)
            .build()
            .expect("valid options");

        assert_eq!(opts.default_step_size, 0.02);
        assert!(opts.whole_path);
        assert_eq!(opts.ratio_min, ProfileOptions::default().ratio_min);
    }

    #[test]
    // Purpose
    // -------
    // Violations of `0 < min <= default <= max` are rejected.
    //
    // Given
    // -----
    // - Negative default step, default below min, max below default.
    //
    // Expect
    // ------
    // - `InvalidOption` naming the offending field each time.
    fn step_size_ordering_is_enforced() {
        let name_of = |res: ProfilingResult<ProfileOptions>| match res {
            Err(ProfilingError::InvalidOption { name, .. }) => name,
            other => panic!("expected InvalidOption, got {other:?}"),
        };

        assert_eq!(
            name_of(ProfileOptions::builder().default_step_size(-1.0).build()),
            "default_step_size"
        );
        assert_eq!(
            name_of(ProfileOptions::builder().default_step_size(1.0).min_step_size(2.0).build()),
            "default_step_size"
        );
        assert_eq!(
            name_of(ProfileOptions::builder().default_step_size(2.0).min_step_size(1.0).build()),
            "max_step_size"
        );
        assert_eq!(
            name_of(ProfileOptions::builder().min_step_size(2.0).max_step_size(1.0).build()),
            "default_step_size"
        );
    }

    #[test]
    // Purpose
    // -------
    // Ratio and factor options respect their open intervals.
    //
    // Given
    // -----
    // - `step_size_factor = 1`, `ratio_min = 1`, `delta_ratio_max = NaN`,
    //   `reg_points = 1`.
    //
    // Expect
    // ------
    // - Each build fails.
    fn ratio_and_factor_ranges_are_enforced() {
        assert!(ProfileOptions::builder().step_size_factor(1.0).build().is_err());
        assert!(ProfileOptions::builder().ratio_min(1.0).build().is_err());
        assert!(ProfileOptions::builder().delta_ratio_max(f64::NAN).build().is_err());
        assert!(ProfileOptions::builder().reg_points(1).build().is_err());
        assert!(ProfileOptions::builder().max_tries(0).build().is_err());
    }
}
