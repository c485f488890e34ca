const METRICS_NAMESPACE: &str = "METRICS_NAMESPACE";

const DEFAULT_NAMESPACE: &str = "Monitor";

pub fn get_default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

pub fn get_namespace() -> Option<String> {
    non_empty_env(METRICS_NAMESPACE)
}

const STAGE_NAME: &str = "STAGE_NAME";

pub fn get_stage() -> Option<String> {
    std::env::var(STAGE_NAME).ok()
}

const MONITOR_INTERVAL_SECONDS: &str = "MONITOR_INTERVAL_SECONDS";

const DEFAULT_INTERVAL: u64 = 60;

pub fn get_default_interval() -> u64 {
    DEFAULT_INTERVAL
}

pub fn get_interval() -> Option<u64> {
    std::env::var(MONITOR_INTERVAL_SECONDS)
        .ok()
        .and_then(|res| res.parse().ok())
}

const CLOUDWATCH_DASHBOARD_NAME: &str = "CLOUDWATCH_DASHBOARD_NAME";

const DEFAULT_DASHBOARD_NAME: &str = "CanaryMonitor";

pub fn get_default_dashboard_name() -> String {
    DEFAULT_DASHBOARD_NAME.to_string()
}

pub fn get_dashboard_name() -> Option<String> {
    non_empty_env(CLOUDWATCH_DASHBOARD_NAME)
}

const URL_FILE_NAME: &str = "URL_FILE_NAME";

pub fn get_resources_file() -> Option<String> {
    non_empty_env(URL_FILE_NAME)
}

const TOPIC_ARN: &str = "TOPIC_ARN";

pub fn get_notification_target() -> Option<String> {
    non_empty_env(TOPIC_ARN)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}
