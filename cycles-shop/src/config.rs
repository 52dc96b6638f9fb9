use candid::{CandidType, Deserialize, Principal};
use cycles_log::LogSettings;
use cycles_pricing::ShopConfig;

/// Arguments of the canister `init` method. Every field is optional.
#[derive(Debug, Default, Clone, CandidType, Deserialize, PartialEq)]
pub struct InitArgs {
    /// Principal allowed to administer the shop. Defaults to the installer.
    pub controller: Option<Principal>,
    /// Initial ICP price in USD. The price stays unset when omitted.
    pub icp_price: Option<f64>,
    pub cycles_per_icp: Option<u64>,
    /// Number of usage samples the average is computed over.
    pub usage_window: Option<u64>,
    pub log_settings: Option<LogSettings>,
}

impl InitArgs {
    pub fn shop_config(&self, installer: Principal) -> ShopConfig {
        let defaults = ShopConfig::new(self.controller.unwrap_or(installer));
        ShopConfig {
            icp_price: self.icp_price,
            cycles_per_icp: self.cycles_per_icp.unwrap_or(defaults.cycles_per_icp),
            usage_window: self.usage_window.unwrap_or(defaults.usage_window),
            ..defaults
        }
    }

    pub fn log_settings(&self) -> LogSettings {
        self.log_settings.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use cycles_pricing::{ShopState, CYCLES_PER_ICP, DEFAULT_USAGE_WINDOW};

    use super::*;

    fn installer() -> Principal {
        Principal::from_slice(&[7; 29])
    }

    #[test]
    fn empty_args_use_defaults() {
        let config = InitArgs::default().shop_config(installer());
        assert_eq!(config, ShopConfig::new(installer()));
        assert_eq!(config.cycles_per_icp, CYCLES_PER_ICP);
        assert_eq!(config.usage_window, DEFAULT_USAGE_WINDOW);
        assert_eq!(config.icp_price, None);
        assert_eq!(InitArgs::default().log_settings(), LogSettings::default());
    }

    #[test]
    fn empty_args_build_a_shop() {
        let shop = ShopState::new(InitArgs::default().shop_config(installer()), 0).unwrap();
        assert_eq!(shop.controller(), installer());
        assert_eq!(shop.pricing_info().usage_window, DEFAULT_USAGE_WINDOW);
    }

    #[test]
    fn explicit_args_override_defaults() {
        let controller = Principal::from_slice(&[1; 29]);
        let args = InitArgs {
            controller: Some(controller),
            icp_price: Some(4.2),
            cycles_per_icp: Some(1_000),
            usage_window: Some(5),
            log_settings: Some(LogSettings {
                log_filter: "debug".into(),
                ..Default::default()
            }),
        };

        let config = args.shop_config(installer());
        assert_eq!(config.controller, controller);
        assert_eq!(config.icp_price, Some(4.2));
        assert_eq!(config.cycles_per_icp, 1_000);
        assert_eq!(config.usage_window, 5);
        assert_eq!(args.log_settings().log_filter, "debug");
    }

    #[test]
    fn init_args_decode_from_partial_record() {
        #[derive(CandidType)]
        struct PartialArgs {
            usage_window: Option<u64>,
        }

        let bytes = candid::encode_one(PartialArgs {
            usage_window: Some(10),
        })
        .unwrap();
        let args: InitArgs = candid::decode_one(&bytes).unwrap();
        assert_eq!(args.usage_window, Some(10));
        assert_eq!(args.controller, None);
        assert_eq!(args.log_settings, None);
    }
}
