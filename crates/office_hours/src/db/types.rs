/// Database row types for schedule data

#[derive(Debug, Clone)]
pub struct DbWeeklySchedule {
    pub day_of_week: i64,
    pub enabled: bool,
    pub custom_time: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DbOverride {
    pub date: String,
    pub is_available: bool,
    pub time: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DbCalendarAddition {
    pub date: String,
    pub user_ip: String,
    pub user_agent: String,
}
