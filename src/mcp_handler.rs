use anyhow::{Result, anyhow};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use tracing::{info, warn};

use crate::error::Failure;
use crate::model::{GeneratedNumbers, LotteryType};
use crate::use_cases::UseCases;

#[derive(Debug, serde::Deserialize)]
struct JsonRpcRequest {
    #[serde(default = "default_jsonrpc")]
    #[allow(dead_code)]
    jsonrpc: String,
    method: String,
    params: Option<Value>,
    id: Option<Value>,
}

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Option<Value>,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id: Some(id.unwrap_or(json!(1))),
        }
    }

    fn failure(id: Option<Value>, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data,
            }),
            id,
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

#[derive(Debug, serde::Serialize)]
struct Tool {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

type Arguments = HashMap<String, Value>;

fn required_str<'a>(arguments: &'a Arguments, key: &str) -> Result<&'a str> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("Missing {} parameter", key))
}

fn optional_u32(arguments: &Arguments, key: &str) -> Result<Option<u32>> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| anyhow!("{} must be a non-negative integer", key)),
    }
}

fn required_u32(arguments: &Arguments, key: &str) -> Result<u32> {
    optional_u32(arguments, key)?.ok_or_else(|| anyhow!("Missing {} parameter", key))
}

fn history_json(entries: &[GeneratedNumbers]) -> Value {
    json!({
        "success": true,
        "count": entries.len(),
        "results": entries
    })
}

/// Line-delimited JSON-RPC 2.0 over any reader/writer pair, one tool per use
/// case.
pub struct MCPHandler {
    use_cases: UseCases,
}

impl MCPHandler {
    pub fn new(use_cases: UseCases) -> Self {
        Self { use_cases }
    }

    pub async fn serve<R, W>(self, reader: R, mut writer: W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(req) => req,
                Err(e) => {
                    warn!("Failed to parse request: {} - Line: {}", e, line);
                    let error_response = JsonRpcResponse::failure(
                        None,
                        -32700,
                        "Parse error".to_string(),
                        Some(json!(e.to_string())),
                    );
                    writeln!(writer, "{}", serde_json::to_string(&error_response)?)?;
                    writer.flush()?;
                    continue;
                }
            };

            // Notifications never get a response.
            if request.id.is_none() || request.method.starts_with("notifications/") {
                if request.method == "notifications/initialized" {
                    info!("client initialized");
                }
                continue;
            }

            let response = self.handle_request(request).await;
            writeln!(writer, "{}", serde_json::to_string(&response)?)?;
            writer.flush()?;
        }

        Ok(())
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "tools/list" => JsonRpcResponse::success(request.id, json!({ "tools": get_tools() })),
            "tools/call" => self.handle_call_tool(request.params, request.id).await,
            _ => JsonRpcResponse::failure(
                Some(request.id.unwrap_or(json!(1))),
                -32601,
                format!("Method not found: {}", request.method),
                None,
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("initializing lotto generator tool server");
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "lotto-generator",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    async fn handle_call_tool(&self, params: Option<Value>, id: Option<Value>) -> JsonRpcResponse {
        let id = Some(id.unwrap_or(json!(1)));

        let Some(params) = params else {
            return JsonRpcResponse::failure(id, -32602, "Missing params".to_string(), None);
        };
        let Some(tool_name) = params.get("name").and_then(|n| n.as_str()) else {
            return JsonRpcResponse::failure(id, -32602, "Missing tool name".to_string(), None);
        };

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
        let arguments: Arguments = serde_json::from_value(arguments).unwrap_or_default();

        match self.execute_tool(tool_name, &arguments).await {
            Ok(content) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [
                        {
                            "type": "text",
                            "text": content
                        }
                    ]
                }),
            ),
            Err(e) => {
                let data = e.downcast_ref::<Failure>().map(|failure| json!(failure));
                JsonRpcResponse::failure(id, -32603, format!("Tool execution error: {}", e), data)
            }
        }
    }

    async fn execute_tool(&self, tool_name: &str, arguments: &Arguments) -> Result<String> {
        let result = match tool_name {
            "list_lottery_types" => self.list_lottery_types().await?,
            "generate_numbers" => self.generate_numbers(arguments).await?,
            "get_history" => self.get_history(arguments).await?,
            "get_history_page" => self.get_history_page(arguments).await?,
            "get_history_count" => {
                let count = self.use_cases.get_history_count.execute().await?;
                json!({ "success": true, "count": count })
            }
            "get_history_entry" => {
                let id = required_str(arguments, "id")?;
                let entry = self.use_cases.get_history_detail.execute(id).await?;
                json!({ "success": true, "result": entry })
            }
            "delete_history_entry" => {
                let id = required_str(arguments, "id")?;
                self.use_cases.delete_history.execute(id).await?;
                json!({ "success": true, "message": format!("Deleted history entry {}", id) })
            }
            "clear_history" => {
                self.use_cases.clear_history.execute().await?;
                json!({ "success": true, "message": "History cleared" })
            }
            "list_custom_lottery_types" => {
                let types = self.use_cases.get_custom_lottery_types.execute().first().await?;
                json!({ "success": true, "results": types })
            }
            "get_custom_lottery_type" => {
                let id = required_str(arguments, "id")?;
                let found = self.use_cases.get_custom_lottery_type_by_id.execute(id).await?;
                json!({ "success": true, "result": found })
            }
            "save_custom_lottery_type" => self.save_custom_lottery_type(arguments).await?,
            "delete_custom_lottery_type" => {
                let id = required_str(arguments, "id")?;
                self.use_cases.delete_custom_lottery_type.execute(id).await?;
                json!({ "success": true, "message": format!("Deleted custom lottery type {}", id) })
            }
            "select_lottery_type" => {
                let id = required_str(arguments, "lottery_type_id")?;
                self.find_lottery_type(id).await?;
                self.use_cases.save_selected_lottery_type_id.execute(id).await?;
                self.use_cases.clear_last_generated_numbers.execute().await?;
                json!({ "success": true, "selected_lottery_type_id": id })
            }
            "get_preferences" => self.get_preferences().await?,
            "accept_disclaimer" => {
                self.use_cases.accept_disclaimer.execute().await?;
                json!({ "success": true, "disclaimer_accepted": true })
            }
            _ => return Err(anyhow!("Unknown tool: {}", tool_name)),
        };

        Ok(result.to_string())
    }

    async fn find_lottery_type(&self, id: &str) -> Result<LotteryType> {
        self.use_cases
            .get_lottery_types
            .execute()
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Failure::not_found(format!("Unknown lottery type: {}", id)).into())
    }

    async fn list_lottery_types(&self) -> Result<Value> {
        let types = self.use_cases.get_lottery_types.execute().await?;
        let described: Vec<Value> = types
            .iter()
            .map(|t| json!({ "lottery_type": t, "description": t.description() }))
            .collect();
        Ok(json!({ "success": true, "results": described }))
    }

    /// Generates for the given type, or the saved selection when no type is
    /// passed, and remembers the result as the last generated one.
    async fn generate_numbers(&self, arguments: &Arguments) -> Result<Value> {
        let lottery_type_id = match arguments.get("lottery_type_id").and_then(|v| v.as_str()) {
            Some(id) => id.to_string(),
            None => self
                .use_cases
                .get_selected_lottery_type_id
                .execute()
                .first()
                .await?
                .ok_or_else(|| anyhow!("Missing lottery_type_id parameter"))?,
        };
        let lottery_type = self.find_lottery_type(&lottery_type_id).await?;

        let numbers = self.use_cases.generate_numbers.execute(lottery_type).await?;
        self.use_cases
            .save_last_generated_numbers_id
            .execute(&numbers.id)
            .await?;

        Ok(json!({
            "success": true,
            "result": numbers,
            "main_numbers": numbers.main_numbers_formatted(),
            "bonus_numbers": numbers.bonus_numbers_formatted(),
            "date": numbers.formatted_date()
        }))
    }

    async fn get_history(&self, arguments: &Arguments) -> Result<Value> {
        let feed = match arguments.get("lottery_type_id").and_then(|v| v.as_str()) {
            Some(id) => self.use_cases.get_history.by_type(id),
            None => self.use_cases.get_history.all(),
        };
        Ok(history_json(&feed.first().await?))
    }

    async fn get_history_page(&self, arguments: &Arguments) -> Result<Value> {
        let limit = optional_u32(arguments, "limit")?.unwrap_or(20);
        let offset = optional_u32(arguments, "offset")?.unwrap_or(0);
        let entries = self.use_cases.get_history_page.execute(limit, offset).await?;
        Ok(history_json(&entries))
    }

    async fn save_custom_lottery_type(&self, arguments: &Arguments) -> Result<Value> {
        let display_name = required_str(arguments, "name")?.trim().to_string();
        let bonus_number_count = optional_u32(arguments, "bonus_number_count")?.unwrap_or(0);
        let lottery_type = LotteryType {
            id: arguments
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            name: display_name.to_lowercase().replace(' ', "_"),
            display_name,
            main_number_count: required_u32(arguments, "main_number_count")?,
            main_number_max: required_u32(arguments, "main_number_max")?,
            bonus_number_count,
            bonus_number_max: if bonus_number_count > 0 {
                required_u32(arguments, "bonus_number_max")?
            } else {
                0
            },
            is_custom: true,
        };

        let saved = self
            .use_cases
            .save_custom_lottery_type
            .execute(lottery_type)
            .await?;
        Ok(json!({ "success": true, "result": saved }))
    }

    async fn get_preferences(&self) -> Result<Value> {
        let selected = self
            .use_cases
            .get_selected_lottery_type_id
            .execute()
            .first()
            .await?;
        let last = self
            .use_cases
            .get_last_generated_numbers_id
            .execute()
            .first()
            .await?;
        let accepted = self.use_cases.get_disclaimer_accepted.execute().first().await?;

        Ok(json!({
            "success": true,
            "selected_lottery_type_id": selected,
            "last_generated_numbers_id": last,
            "disclaimer_accepted": accepted
        }))
    }
}

fn tool(name: &str, description: &str, input_schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

fn id_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string", "description": description }
        },
        "required": ["id"]
    })
}

fn no_arguments() -> Value {
    json!({ "type": "object", "properties": {} })
}

fn get_tools() -> Vec<Tool> {
    vec![
        tool(
            "list_lottery_types",
            "List predefined lottery types followed by custom ones",
            no_arguments(),
        ),
        tool(
            "generate_numbers",
            "Generate numbers for a lottery type and save them to history",
            json!({
                "type": "object",
                "properties": {
                    "lottery_type_id": {
                        "type": "string",
                        "description": "Lottery type id; defaults to the saved selection"
                    }
                }
            }),
        ),
        tool(
            "get_history",
            "Get generated numbers, newest first",
            json!({
                "type": "object",
                "properties": {
                    "lottery_type_id": {
                        "type": "string",
                        "description": "Only entries for this lottery type"
                    }
                }
            }),
        ),
        tool(
            "get_history_page",
            "Get one page of history, newest first",
            json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "integer", "description": "Page size (default: 20)" },
                    "offset": { "type": "integer", "description": "Entries to skip (default: 0)" }
                }
            }),
        ),
        tool("get_history_count", "Count history entries", no_arguments()),
        tool(
            "get_history_entry",
            "Get one history entry",
            id_schema("History entry id"),
        ),
        tool(
            "delete_history_entry",
            "Delete one history entry",
            id_schema("History entry id"),
        ),
        tool("clear_history", "Delete every history entry", no_arguments()),
        tool(
            "list_custom_lottery_types",
            "List custom lottery types in creation order",
            no_arguments(),
        ),
        tool(
            "get_custom_lottery_type",
            "Get one custom lottery type",
            id_schema("Custom lottery type id"),
        ),
        tool(
            "save_custom_lottery_type",
            "Create or update a custom lottery type",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Existing id to update; omit to create" },
                    "name": { "type": "string", "description": "Display name" },
                    "main_number_count": { "type": "integer", "description": "1 to 10" },
                    "main_number_max": { "type": "integer", "description": "1 to 99" },
                    "bonus_number_count": { "type": "integer", "description": "0 to 3" },
                    "bonus_number_max": { "type": "integer", "description": "1 to 99 when bonus numbers are used" }
                },
                "required": ["name", "main_number_count", "main_number_max"]
            }),
        ),
        tool(
            "delete_custom_lottery_type",
            "Delete a custom lottery type; its history stays",
            id_schema("Custom lottery type id"),
        ),
        tool(
            "select_lottery_type",
            "Remember the selected lottery type",
            json!({
                "type": "object",
                "properties": {
                    "lottery_type_id": { "type": "string", "description": "Lottery type id" }
                },
                "required": ["lottery_type_id"]
            }),
        ),
        tool(
            "get_preferences",
            "Read the saved selection, last result id and disclaimer flag",
            no_arguments(),
        ),
        tool("accept_disclaimer", "Accept the disclaimer", no_arguments()),
    ]
}

pub fn stdio() -> (BufReader<io::Stdin>, io::Stdout) {
    (BufReader::new(io::stdin()), io::stdout())
}
