//! Wizard state - the three-step connect / pick / generate flow
//!
//! Validation, step transitions and interpretation of backend responses.
//! Select widgets and the request runner live in `App`; this module only
//! decides what the responses mean for the wizard.

use crate::config::FormDefaults;
use crate::error::{ApiError, ValidationError};
use crate::services::api::{
    extract_error_message, ApiResponse, ConnectionInfo, GenerateRequest, TablesRequest,
};
use crate::services::download::SavedDownload;
use serde_json::Value;

/// Fixed namespace prepended to package suggestions
pub const PACKAGE_PREFIX: &str = "com.example";
pub const PACKAGE_HINT_DEFAULT: &str = "根据表名自动生成包名";

const MSG_NO_DATABASES: &str = "未找到数据库";
const MSG_CONNECT_FAILED: &str = "连接失败，请检查数据库连接信息";
const MSG_NO_TABLES: &str = "未找到表";
const MSG_TABLES_FAILED: &str = "获取表列表失败";
const MSG_SERVER_UNREACHABLE: &str = "无法连接到服务器，请检查后端服务是否正常运行";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Connect,
    PickTable,
    Generate,
}

impl Step {
    pub fn all() -> [Step; 3] {
        [Step::Connect, Step::PickTable, Step::Generate]
    }

    pub fn number(&self) -> usize {
        match self {
            Step::Connect => 1,
            Step::PickTable => 2,
            Step::Generate => 3,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Step::Connect => "连接数据库",
            Step::PickTable => "选择数据表",
            Step::Generate => "生成代码",
        }
    }

    /// Focus order of the step's fields and buttons
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Step::Connect => &[
                Field::DbUrl,
                Field::DbUsername,
                Field::DbPassword,
                Field::Connect,
            ],
            Step::PickTable => &[
                Field::Database,
                Field::Table,
                Field::BackToStep1,
                Field::NextToStep3,
            ],
            Step::Generate => &[
                Field::PackageName,
                Field::OutputDir,
                Field::BackToStep2,
                Field::Download,
                Field::GenerateOnServer,
                Field::Reset,
            ],
        }
    }
}

/// Every focusable element of the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    DbUrl,
    DbUsername,
    DbPassword,
    Connect,
    Database,
    Table,
    BackToStep1,
    NextToStep3,
    PackageName,
    OutputDir,
    BackToStep2,
    Download,
    GenerateOnServer,
    Reset,
}

impl Field {
    pub fn label(&self) -> &str {
        match self {
            Field::DbUrl => "数据库连接地址",
            Field::DbUsername => "用户名",
            Field::DbPassword => "密码",
            Field::Connect => "连接数据库",
            Field::Database => "数据库",
            Field::Table => "数据表",
            Field::BackToStep1 | Field::BackToStep2 => "上一步",
            Field::NextToStep3 => "下一步",
            Field::PackageName => "包名",
            Field::OutputDir => "输出目录",
            Field::Download => "开始生成代码",
            Field::GenerateOnServer => "生成到服务器",
            Field::Reset => "重置",
        }
    }

    pub fn is_button(&self) -> bool {
        matches!(
            self,
            Field::Connect
                | Field::BackToStep1
                | Field::NextToStep3
                | Field::BackToStep2
                | Field::Download
                | Field::GenerateOnServer
                | Field::Reset
        )
    }

    pub fn is_select(&self) -> bool {
        matches!(self, Field::Database | Field::Table)
    }
}

/// Request kinds that put the wizard into a busy state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Databases,
    Tables,
    Generate,
}

/// Result line shown under the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub success: bool,
    pub message: String,
}

/// What a tables response did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TablesOutcome {
    /// An older request; the response was dropped
    Stale,
    /// `table_list` was replaced with a non-empty list
    Loaded,
    /// Failure or empty list; the table selection should be cleared
    Cleared,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionForm {
    pub db_url: String,
    pub db_username: String,
    pub db_password: String,
}

impl ConnectionForm {
    pub fn to_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            db_url: self.db_url.trim().to_string(),
            db_username: self.db_username.trim().to_string(),
            db_password: self.db_password.trim().to_string(),
        }
    }
}

/// Package suggestion for a table: `sys_user` -> `com.example.sys.user`
pub fn package_suggestion(table: &str) -> Option<String> {
    if table.is_empty() {
        return None;
    }
    Some(format!("{}.{}", PACKAGE_PREFIX, table.replace('_', ".")))
}

#[derive(Debug, Clone, Copy, Default)]
struct InFlight {
    databases: bool,
    /// Generation of the newest tables request still outstanding
    tables: Option<u64>,
    generate: bool,
}

#[derive(Debug, Clone)]
pub struct WizardState {
    pub step: Step,
    pub database_list: Vec<String>,
    pub table_list: Vec<String>,
    pub connection: ConnectionForm,
    pub package_name: String,
    pub output_dir: String,
    pub package_hint: String,
    pub notice: Option<Notice>,
    in_flight: InFlight,
    tables_generation: u64,
    defaults: FormDefaults,
}

impl WizardState {
    pub fn new(defaults: FormDefaults) -> Self {
        let mut state = Self {
            step: Step::Connect,
            database_list: Vec::new(),
            table_list: Vec::new(),
            connection: ConnectionForm::default(),
            package_name: String::new(),
            output_dir: String::new(),
            package_hint: PACKAGE_HINT_DEFAULT.to_string(),
            notice: None,
            in_flight: InFlight::default(),
            tables_generation: 0,
            defaults,
        };
        state.restore_defaults();
        state
    }

    fn restore_defaults(&mut self) {
        self.connection = ConnectionForm {
            db_url: self.defaults.db_url.clone(),
            db_username: self.defaults.db_username.clone(),
            db_password: String::new(),
        };
        self.package_name.clear();
        self.output_dir = self.defaults.output_dir.clone();
    }

    /// Back to step 1 with empty lists and fresh forms
    ///
    /// Requests still in flight are not cancelled; stale tables responses
    /// are dropped by the generation check.
    pub fn reset(&mut self) {
        self.restore_defaults();
        self.database_list.clear();
        self.table_list.clear();
        self.abandon_tables();
        self.notice = None;
        self.go_to_step(Step::Connect, "");
    }

    /// Move to `step`; entering step 3 refreshes the package suggestion
    pub fn go_to_step(&mut self, step: Step, selected_table: &str) {
        self.step = step;
        if step == Step::Generate {
            self.suggest_package(selected_table);
        }
    }

    pub fn suggest_package(&mut self, table: &str) {
        self.package_hint = match package_suggestion(table) {
            Some(package) => format!("建议: {}", package),
            None => PACKAGE_HINT_DEFAULT.to_string(),
        };
    }

    /// Copy the suggestion for `table` into the package field
    pub fn apply_suggestion(&mut self, table: &str) -> bool {
        match package_suggestion(table) {
            Some(package) => {
                self.package_name = package;
                true
            }
            None => false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Notices & busy state
    // ─────────────────────────────────────────────────────────────────────────

    pub fn succeed(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            success: true,
            message: message.into(),
        });
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            success: false,
            message: message.into(),
        });
    }

    pub fn is_busy(&self, kind: RequestKind) -> bool {
        match kind {
            RequestKind::Databases => self.in_flight.databases,
            RequestKind::Tables => self.in_flight.tables.is_some(),
            RequestKind::Generate => self.in_flight.generate,
        }
    }

    pub fn any_busy(&self) -> bool {
        self.in_flight.databases || self.in_flight.tables.is_some() || self.in_flight.generate
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    pub fn validate_connection(&self) -> Result<ConnectionInfo, ValidationError> {
        let info = self.connection.to_info();
        if info.db_url.is_empty() || info.db_username.is_empty() {
            return Err(ValidationError::MissingConnection);
        }
        Ok(info)
    }

    pub fn validate_selection(&self, database: &str, table: &str) -> Result<(), ValidationError> {
        if database.is_empty() {
            return Err(ValidationError::MissingDatabase);
        }
        if table.is_empty() {
            return Err(ValidationError::MissingTable);
        }
        Ok(())
    }

    pub fn build_generate_request(
        &self,
        database: &str,
        table: &str,
    ) -> Result<GenerateRequest, ValidationError> {
        self.validate_selection(database, table)?;
        let package_name = self.package_name.trim();
        if package_name.is_empty() {
            return Err(ValidationError::MissingPackage);
        }

        Ok(GenerateRequest {
            connection: self.connection.to_info(),
            database_name: database.to_string(),
            table_name: table.to_string(),
            package_name: package_name.to_string(),
            output_dir: self.output_dir.trim().to_string(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Mark a databases request as issued; hides the previous notice
    pub fn begin_databases(&mut self) {
        self.in_flight.databases = true;
        self.notice = None;
    }

    /// Issue a new tables request token; older tokens become stale
    pub fn begin_tables(&mut self, database: &str) -> TablesRequest {
        self.tables_generation += 1;
        self.in_flight.tables = Some(self.tables_generation);
        self.notice = None;
        TablesRequest {
            connection: self.connection.to_info(),
            database_name: database.to_string(),
        }
    }

    /// No database selected: make any outstanding tables request stale
    pub fn abandon_tables(&mut self) {
        self.tables_generation += 1;
        self.in_flight.tables = None;
    }

    pub fn tables_generation(&self) -> u64 {
        self.tables_generation
    }

    pub fn begin_generate(&mut self) {
        self.in_flight.generate = true;
        self.notice = None;
    }

    /// Returns true when the wizard advanced to step 2
    pub fn apply_databases(&mut self, result: Result<ApiResponse<Vec<String>>, ApiError>) -> bool {
        self.in_flight.databases = false;
        match result {
            Ok(response) => match response.data.as_deref() {
                Some(list) if response.success && !list.is_empty() => {
                    self.database_list = list.to_vec();
                    self.succeed(format!("连接成功！找到 {} 个数据库", list.len()));
                    self.go_to_step(Step::PickTable, "");
                    true
                }
                _ => {
                    self.fail(response.message_or(MSG_NO_DATABASES));
                    false
                }
            },
            Err(e) => {
                log::warn!("Listing databases failed: {}", e);
                self.fail(MSG_CONNECT_FAILED);
                false
            }
        }
    }

    pub fn apply_tables(
        &mut self,
        generation: u64,
        database: &str,
        result: Result<ApiResponse<Vec<String>>, ApiError>,
    ) -> TablesOutcome {
        if generation != self.tables_generation {
            log::info!(
                "Dropping stale tables response for {} (request #{}, current #{})",
                database,
                generation,
                self.tables_generation
            );
            return TablesOutcome::Stale;
        }
        self.in_flight.tables = None;

        match result {
            Ok(response) => match response.data.as_deref() {
                Some(list) if response.success && !list.is_empty() => {
                    self.table_list = list.to_vec();
                    self.succeed(format!("找到 {} 个表", list.len()));
                    TablesOutcome::Loaded
                }
                _ => {
                    self.fail(response.message_or(MSG_NO_TABLES));
                    TablesOutcome::Cleared
                }
            },
            Err(e) => {
                log::warn!("Listing tables of {} failed: {}", database, e);
                self.fail(MSG_TABLES_FAILED);
                TablesOutcome::Cleared
            }
        }
    }

    pub fn apply_download(&mut self, result: Result<SavedDownload, ApiError>) {
        self.in_flight.generate = false;
        match result {
            Ok(saved) => {
                self.succeed(format!("代码生成成功！文件已下载: {}", saved.filename));
            }
            Err(ApiError::Status { status, body }) => {
                log::warn!("Download failed with HTTP {}", status);
                self.fail(extract_error_message(&body));
            }
            Err(ApiError::Io(e)) => {
                log::error!("Could not save download: {}", e);
                self.fail(format!("保存文件失败: {}", e));
            }
            Err(e) => {
                log::warn!("Download request failed: {}", e);
                self.fail(MSG_SERVER_UNREACHABLE);
            }
        }
    }

    pub fn apply_generate(&mut self, result: Result<ApiResponse<Value>, ApiError>) {
        self.in_flight.generate = false;
        match result {
            Ok(response) if response.success => {
                let location = match &response.data {
                    Some(Value::String(path)) if !path.is_empty() => path.clone(),
                    Some(Value::Null) | None => "默认目录".to_string(),
                    Some(other) => other.to_string(),
                };
                let fallback = format!("代码生成成功！文件已保存到: {}", location);
                let message = response.message_or(&fallback).to_string();
                self.succeed(message);
            }
            Ok(response) => {
                self.fail(response.message_or(""));
            }
            Err(e) => {
                log::warn!("Generate request failed: {}", e);
                self.fail(MSG_SERVER_UNREACHABLE);
            }
        }
    }
}
