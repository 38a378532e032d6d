//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# tabshell configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[views]
# pool_size = 1                    # 0-4, pre-warmed surfaces per destination class
# readiness_timeout_ms = 5000      # 100-60000
# partition = "persist:tabshell"
# user_agent = "Mozilla/5.0 ..."

[tabs]
# default_url = "tabshell://core/new-tab"
# closed_stack_capacity = 96       # 1-1024
# persist_debounce_ms = 200        # 0-5000
# restore_on_launch = true

[overlay]
# pool_size = 1                    # 0-2
# url = "tabshell://core/command-palette"

[persistence]
# path = "/path/to/tabs.json"

[logging]
# level = "info"                   # trace, debug, info, warn, error
"##
    .to_string()
}
