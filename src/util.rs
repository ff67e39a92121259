const EMAIL_RECIPIENT: &str = "EMAIL_RECIPIENT";

pub fn get_recipient() -> Option<String> {
    non_empty_var(EMAIL_RECIPIENT)
}

const SES_FROM_ADDRESS: &str = "SES_FROM_ADDRESS";

pub fn get_sender() -> Option<String> {
    non_empty_var(SES_FROM_ADDRESS)
}

const AWS_REGION: &str = "AWS_REGION";

pub fn get_region() -> Option<String> {
    non_empty_var(AWS_REGION)
}

const STATE_BUCKET: &str = "STATE_BUCKET";

const DEFAULT_BUCKET: &str = "watershed-monitor-state";

pub fn get_state_bucket() -> String {
    non_empty_var(STATE_BUCKET).unwrap_or_else(|| DEFAULT_BUCKET.to_string())
}

const ALERT_WEBHOOK_URL: &str = "ALERT_WEBHOOK_URL";

pub fn get_webhook_url() -> Option<String> {
    non_empty_var(ALERT_WEBHOOK_URL)
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
