//! Merging YAML overrides onto the environment configuration.

use std::path::PathBuf;

use super::env::{DEFAULT_API_SECRET_ID, load_from_env};
use super::yaml::{AssistantYaml, AuthYaml, ServerYaml, YamlConfig};
use super::{AuthApiSecret, ServerConfig, TlsConfig};

/// Load the environment configuration and apply YAML values on top
pub(super) fn merge_config(
    yaml: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = load_from_env()?;

    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(server) = yaml.server {
        merge_server(&mut config, server)?;
    }

    if let Some(telephony) = yaml.telephony {
        override_opt(&mut config.vapi_token, telephony.vapi_token);
        if let Some(base_url) = telephony.base_url {
            config.vapi_base_url = base_url;
        }
        override_opt(&mut config.assistant_id, telephony.assistant_id);
        override_opt(&mut config.phone_number_id, telephony.phone_number_id);
        override_opt(
            &mut config.transfer_phone_number,
            telephony.transfer_phone_number,
        );
        if let Some(timeout) = telephony.timeout_seconds {
            config.telephony_timeout_seconds = timeout;
        }
        override_opt(&mut config.webhook_secret, telephony.webhook_secret);
    }

    if let Some(livekit) = yaml.livekit {
        override_opt(&mut config.livekit_url, livekit.url);
        override_opt(&mut config.livekit_api_key, livekit.api_key);
        override_opt(&mut config.livekit_api_secret, livekit.api_secret);
        override_opt(
            &mut config.sip_outbound_trunk_id,
            livekit.sip_outbound_trunk_id,
        );
    }

    if let Some(assistant) = yaml.assistant {
        merge_assistant(&mut config, assistant);
    }

    if let Some(auth) = yaml.auth {
        merge_auth(&mut config, auth);
    }

    if let Some(security) = yaml.security {
        override_opt(
            &mut config.cors_allowed_origins,
            security.cors_allowed_origins,
        );
        if let Some(rps) = security.rate_limit_requests_per_second {
            config.rate_limit_requests_per_second = rps;
        }
        if let Some(burst) = security.rate_limit_burst_size {
            config.rate_limit_burst_size = burst;
        }
    }

    Ok(config)
}

/// Replace `target` when the YAML value is present and non-blank
fn override_opt(target: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        *target = Some(value);
    }
}

fn merge_server(config: &mut ServerConfig, server: ServerYaml) -> Result<(), String> {
    if let Some(host) = server.host {
        config.host = host;
    }
    if let Some(port) = server.port {
        config.port = port;
    }

    let Some(tls) = server.tls else {
        return Ok(());
    };

    match tls.enabled {
        Some(false) => config.tls = None,
        Some(true) => {
            let cert_path = tls
                .cert_path
                .map(PathBuf::from)
                .or_else(|| config.tls.as_ref().map(|t| t.cert_path.clone()))
                .ok_or("TLS is enabled but no cert_path is configured")?;
            let key_path = tls
                .key_path
                .map(PathBuf::from)
                .or_else(|| config.tls.as_ref().map(|t| t.key_path.clone()))
                .ok_or("TLS is enabled but no key_path is configured")?;
            config.tls = Some(TlsConfig {
                cert_path,
                key_path,
            });
        }
        None => {
            if let Some(existing) = config.tls.as_mut() {
                if let Some(cert_path) = tls.cert_path {
                    existing.cert_path = PathBuf::from(cert_path);
                }
                if let Some(key_path) = tls.key_path {
                    existing.key_path = PathBuf::from(key_path);
                }
            }
        }
    }

    Ok(())
}

fn merge_assistant(config: &mut ServerConfig, yaml: AssistantYaml) {
    let assistant = &mut config.assistant;

    if let Some(name) = yaml.name {
        assistant.name = name;
    }
    if let Some(prompt) = yaml.system_prompt {
        assistant.system_prompt = prompt;
    }
    if let Some(message) = yaml.first_message {
        assistant.first_message = message;
    }
    if let Some(model) = yaml.model {
        if let Some(provider) = model.provider {
            assistant.model.provider = provider;
        }
        if let Some(name) = model.model {
            assistant.model.model = name;
        }
        if model.temperature.is_some() {
            assistant.model.temperature = model.temperature;
        }
    }
    if let Some(voice) = yaml.voice {
        if let Some(provider) = voice.provider {
            assistant.voice.provider = provider;
        }
        if let Some(voice_id) = voice.voice_id {
            assistant.voice.voice_id = voice_id;
        }
    }
}

fn merge_auth(config: &mut ServerConfig, auth: AuthYaml) {
    if let Some(required) = auth.required {
        config.auth_required = required;
    }

    if !auth.api_secrets.is_empty() {
        config.auth_api_secrets = auth
            .api_secrets
            .into_iter()
            .map(|entry| AuthApiSecret {
                id: entry.id.trim().to_string(),
                secret: entry.secret,
            })
            .collect();
    } else if let Some(secret) = auth.api_secret {
        config.auth_api_secrets = vec![AuthApiSecret {
            id: DEFAULT_API_SECRET_ID.to_string(),
            secret,
        }];
    }
}
