//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# navicord configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.
# DISCORD_TOKEN, DISCORD_CLIENT_ID and ACTIVITY_NAME in the environment
# (or a .env file) take precedence over this file.

[gateway]
# api_base = "https://discord.com/api"
# api_version = 10              # 6-10
# token = ""
# application_id = ""
# handshake_timeout_secs = 30   # 5-120
# connect_timeout_secs = 15     # 1-60
# reconnect_on_missed_ack = true

[gateway.identify]
# os = "Windows 10"
# browser = "Discord Client"
# device = "Discord Client"

[backoff]
# initial_secs = 5.0
# factor = 2.0                  # 1.5-2.0
# max_secs = 60.0

[presence]
# activity_name = "artist"      # artist | album | track | any other text
# status = "online"             # online | idle | dnd | invisible
# afk = false
# activity_type = 2             # 2 = Listening

[assets]
# fallback_image_url = "https://raw.githubusercontent.com/navidrome/navidrome/master/resources/logo-192x192.png"
# upload_timeout_secs = 10      # 1-60

[logging]
# level = "INFO"                # DEBUG | INFO | WARNING | ERROR
"##
    .to_string()
}
