//! Integration tests for Odoo MCP Server
//!
//! The Odoo instance is replaced by a mockito server answering XML-RPC, so
//! these tests exercise the real client, tool handler and HTTP router end to end.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};
use tower::ServiceExt;

use odoo_mcp_server::config::{Config, OdooDefaults};
use odoo_mcp_server::error::OdooError;
use odoo_mcp_server::http::{router, AppState};
use odoo_mcp_server::mcp::tools::{names, ToolHandler};
use odoo_mcp_server::odoo::session::Session;
use odoo_mcp_server::odoo::types::{ConnectRequest, ConnectionParams};

const UID: i64 = 2;

/// Wrap a `<value>` payload in a methodResponse
fn xml_response(value: &str) -> String {
    format!(
        "<?xml version='1.0'?>\n<methodResponse>\n<params>\n<param>\n<value>{}</value>\n</param>\n</params>\n</methodResponse>\n",
        value
    )
}

fn xml_fault(code: i64, message: &str) -> String {
    format!(
        "<?xml version='1.0'?>\n<methodResponse>\n<fault>\n<value><struct>\n<member><name>faultCode</name><value><int>{}</int></value></member>\n<member><name>faultString</name><value><string>{}</string></value></member>\n</struct></value>\n</fault>\n</methodResponse>\n",
        code, message
    )
}

fn partners_xml() -> &'static str {
    r#"<array><data>
<value><struct>
<member><name>id</name><value><int>7</int></value></member>
<member><name>name</name><value><string>Azure Interior</string></value></member>
<member><name>email</name><value><string>azure.Interior24@example.com</string></value></member>
</struct></value>
<value><struct>
<member><name>id</name><value><int>8</int></value></member>
<member><name>name</name><value><string>Deco Addict</string></value></member>
<member><name>email</name><value><boolean>0</boolean></value></member>
</struct></value>
</data></array>"#
}

fn models_xml() -> &'static str {
    r#"<array><data>
<value><struct><member><name>model</name><value><string>res.partner</string></value></member><member><name>name</name><value><string>Contact</string></value></member></struct></value>
<value><struct><member><name>model</name><value><string>sale.order</string></value></member><member><name>name</name><value><string>Sales Order</string></value></member></struct></value>
</data></array>"#
}

fn fields_xml() -> &'static str {
    r#"<struct>
<member><name>name</name><value><struct>
<member><name>type</name><value><string>char</string></value></member>
<member><name>string</name><value><string>Name</string></value></member>
</struct></value></member>
</struct>"#
}

fn groups_xml() -> &'static str {
    "<array><data><value><struct><member><name>stage_id_count</name><value><int>3</int></value></member></struct></value></data></array>"
}

fn name_search_xml() -> &'static str {
    "<array><data><value><array><data><value><int>7</int></value><value><string>Azure Interior</string></value></data></array></value></data></array>"
}

fn defaults_for(server: &ServerGuard) -> OdooDefaults {
    OdooDefaults {
        url: Some(format!("{}/", server.url())),
        database: Some("demo".to_string()),
        username: Some("admin".to_string()),
        password: Some("secret".to_string()),
    }
}

fn params_for(server: &ServerGuard) -> ConnectionParams {
    ConnectionParams::resolve(ConnectRequest::default(), &defaults_for(server)).unwrap()
}

fn session() -> Session {
    Session::new(Duration::from_secs(5))
}

async fn mock_login(server: &mut ServerGuard, uid_xml: &str) -> Mock {
    server
        .mock("POST", "/xmlrpc/2/common")
        .match_body(Matcher::Regex(
            "<methodName>authenticate</methodName>".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(xml_response(uid_xml))
        .create_async()
        .await
}

/// Mock an `execute_kw` call whose remote method is `method`
async fn mock_execute(server: &mut ServerGuard, method: &str, body: String) -> Mock {
    server
        .mock("POST", "/xmlrpc/2/object")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("<methodName>execute_kw</methodName>".to_string()),
            Matcher::Regex(format!("<string>{}</string>", method)),
        ]))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(body)
        .create_async()
        .await
}

mod client_tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_and_search_read() {
        let mut server = mockito::Server::new_async().await;
        let login = mock_login(&mut server, &format!("<int>{}</int>", UID)).await;
        let search = mock_execute(&mut server, "search_read", xml_response(partners_xml())).await;

        let session = session();
        let client = session.connect(params_for(&server)).await.unwrap();
        assert_eq!(client.uid(), UID);
        assert_eq!(client.url(), server.url());
        assert!(session.is_connected().await);

        let records = client
            .search_read(
                "res.partner",
                &vec![json!(["is_company", "=", true])],
                &["name".to_string(), "email".to_string()],
                Some(5),
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], "Azure Interior");
        assert_eq!(records[1]["email"], false);

        login.assert_async().await;
        search.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_kw_sends_credentials() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<int>2</int>").await;
        let count = server
            .mock("POST", "/xmlrpc/2/object")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("<param><value><string>demo</string></value></param>".to_string()),
                Matcher::Regex("<param><value><int>2</int></value></param>".to_string()),
                Matcher::Regex("<param><value><string>secret</string></value></param>".to_string()),
                Matcher::Regex("<param><value><string>res.partner</string></value></param>".to_string()),
                Matcher::Regex("<param><value><string>search_count</string></value></param>".to_string()),
            ]))
            .with_body(xml_response("<int>42</int>"))
            .create_async()
            .await;

        let client = session().connect(params_for(&server)).await.unwrap();
        assert_eq!(client.count("res.partner", &Vec::new()).await.unwrap(), 42);

        count.assert_async().await;
    }

    #[tokio::test]
    async fn test_read_by_ids() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<int>2</int>").await;
        let read = server
            .mock("POST", "/xmlrpc/2/object")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("<string>read</string>".to_string()),
                Matcher::Regex(
                    "<array><data><value><int>7</int></value><value><int>8</int></value></data></array>"
                        .to_string(),
                ),
            ]))
            .with_body(xml_response(partners_xml()))
            .create_async()
            .await;

        let client = session().connect(params_for(&server)).await.unwrap();

        let records = client
            .read("res.partner", &[7, 8], &["name".to_string()])
            .await
            .unwrap();
        assert_eq!(records[0]["id"], 7);
        assert_eq!(records[1]["name"], "Deco Addict");

        read.assert_async().await;
    }

    #[tokio::test]
    async fn test_authentication_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<boolean>0</boolean>").await;

        let session = session();
        let err = session.connect(params_for(&server)).await.err().unwrap();

        assert!(matches!(err, OdooError::AuthenticationFailed { .. }));
        assert!(!session.is_connected().await);
    }

    #[tokio::test]
    async fn test_failed_reconnect_keeps_previous_connection() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<int>2</int>").await;

        let session = session();
        session.connect(params_for(&server)).await.unwrap();

        let bad = ConnectionParams::resolve(
            ConnectRequest {
                url: Some("http://127.0.0.1:1".to_string()),
                ..Default::default()
            },
            &defaults_for(&server),
        )
        .unwrap();
        assert!(session.connect(bad).await.is_err());

        let info = session.info().await.unwrap();
        assert_eq!(info.url, server.url());
        assert_eq!(info.uid, 2);
    }

    #[tokio::test]
    async fn test_fault_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<int>2</int>").await;
        let _create = mock_execute(
            &mut server,
            "create",
            xml_fault(2, "The field 'nme' does not exist"),
        )
        .await;

        let client = session().connect(params_for(&server)).await.unwrap();
        let values = json!({"nme": "typo"}).as_object().unwrap().clone();

        match client.create("res.partner", &values).await {
            Err(OdooError::Fault { code, message }) => {
                assert_eq!(code, "2");
                assert!(message.contains("nme"));
            }
            other => panic!("expected fault, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<int>2</int>").await;
        let _unlink = server
            .mock("POST", "/xmlrpc/2/object")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let client = session().connect(params_for(&server)).await.unwrap();
        let err = client.unlink("res.partner", &[7]).await.unwrap_err();

        assert!(matches!(err, OdooError::RequestFailed { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_get_models_filters_locally() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<int>2</int>").await;
        let _models = mock_execute(
            &mut server,
            "ir.model",
            xml_response(
                r#"<array><data>
<value><struct><member><name>model</name><value><string>res.partner</string></value></member><member><name>name</name><value><string>Contact</string></value></member></struct></value>
<value><struct><member><name>model</name><value><string>sale.order</string></value></member><member><name>name</name><value><string>Sales Order</string></value></member></struct></value>
</data></array>"#,
            ),
        )
        .await;

        let client = session().connect(params_for(&server)).await.unwrap();

        let models = client.get_models(Some("RES")).await.unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0]["model"], "res.partner");
    }

    #[tokio::test]
    async fn test_read_group_sends_orderby() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<int>2</int>").await;
        let group = server
            .mock("POST", "/xmlrpc/2/object")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("<string>read_group</string>".to_string()),
                Matcher::Regex("<name>orderby</name><value><string>stage_id</string></value>".to_string()),
                Matcher::Regex("<name>lazy</name><value><boolean>0</boolean></value>".to_string()),
            ]))
            .with_body(xml_response(
                "<array><data><value><struct><member><name>stage_id_count</name><value><int>3</int></value></member></struct></value></data></array>",
            ))
            .create_async()
            .await;

        let client = session().connect(params_for(&server)).await.unwrap();
        let groups = client
            .read_group(
                "crm.lead",
                &Vec::new(),
                &["expected_revenue:sum".to_string()],
                &["stage_id".to_string()],
                Some(10),
                Some("stage_id"),
                false,
            )
            .await
            .unwrap();

        assert_eq!(groups, vec![json!({"stage_id_count": 3})]);
        group.assert_async().await;
    }
}

mod tool_tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_tool_uses_env_defaults() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<int>2</int>").await;
        let _count = mock_execute(&mut server, "search_count", xml_response("<int>42</int>")).await;

        let handler = ToolHandler::new(session(), defaults_for(&server));

        let connected = handler.call_tool(names::CONNECT, json!({})).await;
        assert!(!connected.is_error, "{}", connected.text_content());
        assert_eq!(
            connected.text_content(),
            format!(
                "Successfully connected to Odoo at {} (database: demo)",
                server.url()
            )
        );

        let count = handler
            .call_tool(names::COUNT, json!({"model": "res.partner", "domain": []}))
            .await;
        assert_eq!(count.text_content(), "Record count for res.partner: 42");
    }

    #[tokio::test]
    async fn test_search_tool_text() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<int>2</int>").await;
        let _search = mock_execute(&mut server, "search_read", xml_response(partners_xml())).await;

        let handler = ToolHandler::new(session(), defaults_for(&server));
        handler.call_tool(names::CONNECT, json!({})).await;

        let result = handler
            .call_tool(names::SEARCH, json!({"model": "res.partner", "limit": 2}))
            .await;
        let text = result.text_content();

        assert!(!result.is_error);
        assert!(text.starts_with("Found 2 records: "));
        assert!(text.contains("Deco Addict"));
    }

    #[tokio::test]
    async fn test_write_tool_reports_failure() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<int>2</int>").await;
        let _write = mock_execute(&mut server, "write", xml_fault(1, "Record does not exist")).await;

        let handler = ToolHandler::new(session(), defaults_for(&server));
        handler.call_tool(names::CONNECT, json!({})).await;

        let result = handler
            .call_tool(
                names::WRITE,
                json!({"model": "res.partner", "ids": [999], "values": {"name": "x"}}),
            )
            .await;

        assert!(result.is_error);
        assert!(result
            .text_content()
            .starts_with("Update failed: Odoo fault 1: Record does not exist"));
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let handler = ToolHandler::new(session(), OdooDefaults::default());
        let result = handler
            .call_tool(names::CREATE, json!({"model": "res.partner"}))
            .await;

        assert!(result.is_error);
        assert!(result.text_content().contains("Invalid arguments"));
    }
    /// Handler already connected to `server`
    async fn connected_handler(server: &mut ServerGuard) -> ToolHandler {
        mock_login(server, "<int>2</int>").await;
        let handler = ToolHandler::new(session(), defaults_for(server));
        let connected = handler.call_tool(names::CONNECT, json!({})).await;
        assert!(!connected.is_error, "{}", connected.text_content());
        handler
    }

    #[tokio::test]
    async fn test_create_and_read_tools() {
        let mut server = mockito::Server::new_async().await;
        let handler = connected_handler(&mut server).await;
        let _create = mock_execute(&mut server, "create", xml_response("<int>51</int>")).await;
        let _read = mock_execute(&mut server, "read", xml_response(partners_xml())).await;

        let created = handler
            .call_tool(
                names::CREATE,
                json!({"model": "res.partner", "values": {"name": "New"}}),
            )
            .await;
        assert_eq!(created.text_content(), "Created record with ID: 51");

        let read = handler
            .call_tool(names::READ, json!({"model": "res.partner", "ids": [7, 8]}))
            .await;
        assert!(!read.is_error);
        assert!(read.text_content().starts_with("Found 2 records: ["));
        assert!(read.text_content().contains("\"name\":\"Azure Interior\""));
    }

    #[tokio::test]
    async fn test_unlink_tool_text() {
        let mut server = mockito::Server::new_async().await;
        let handler = connected_handler(&mut server).await;
        let _unlink = mock_execute(&mut server, "unlink", xml_response("<boolean>1</boolean>")).await;

        let result = handler
            .call_tool(names::UNLINK, json!({"model": "res.partner", "ids": [7, 8]}))
            .await;
        assert_eq!(result.text_content(), "Deleted 2 records: true");
    }

    #[tokio::test]
    async fn test_call_tool_text() {
        let mut server = mockito::Server::new_async().await;
        let handler = connected_handler(&mut server).await;
        let _call = mock_execute(&mut server, "name_search", xml_response(name_search_xml())).await;

        let result = handler
            .call_tool(
                names::CALL,
                json!({
                    "model": "res.partner",
                    "method": "name_search",
                    "args": ["Azure"],
                    "kwargs": {"limit": 1}
                }),
            )
            .await;
        assert_eq!(
            result.text_content(),
            r#"Method result: [[7,"Azure Interior"]]"#
        );
    }

    #[tokio::test]
    async fn test_introspection_tools() {
        let mut server = mockito::Server::new_async().await;
        let handler = connected_handler(&mut server).await;
        let _models = mock_execute(&mut server, "ir.model", xml_response(models_xml())).await;
        let _fields = mock_execute(&mut server, "fields_get", xml_response(fields_xml())).await;

        let models = handler
            .call_tool(names::GET_MODELS, json!({"filter": "partner"}))
            .await;
        let text = models.text_content();
        assert!(text.starts_with("Available models: [\n"));
        assert!(text.contains("\"model\": \"res.partner\""));
        assert!(!text.contains("sale.order"));

        let fields = handler
            .call_tool(names::GET_FIELDS, json!({"model": "res.partner"}))
            .await;
        let text = fields.text_content();
        assert!(text.starts_with("Fields for res.partner: {\n"));
        assert!(text.contains("\"type\": \"char\""));
    }

    #[tokio::test]
    async fn test_read_group_tool_text() {
        let mut server = mockito::Server::new_async().await;
        let handler = connected_handler(&mut server).await;
        let _group = mock_execute(&mut server, "read_group", xml_response(groups_xml())).await;

        let result = handler
            .call_tool(
                names::READ_GROUP,
                json!({"model": "crm.lead", "fields": ["stage_id"], "groupby": ["stage_id"]}),
            )
            .await;
        assert_eq!(
            result.text_content(),
            r#"Found 1 groups: [{"stage_id_count":3}]"#
        );
    }

    #[tokio::test]
    async fn test_failures_carry_no_prefix() {
        let handler = ToolHandler::new(session(), OdooDefaults::default());

        let unknown = handler.call_tool("odoo_bogus", json!({})).await;
        assert!(unknown.is_error);
        assert_eq!(unknown.text_content(), "Unknown tool: odoo_bogus");

        let disconnected = handler
            .call_tool(names::SEARCH, json!({"model": "res.partner"}))
            .await;
        assert!(disconnected.is_error);
        assert_eq!(
            disconnected.text_content(),
            "Not connected to Odoo. Use odoo_connect first."
        );
    }
}

mod http_tests {
    use super::*;

    fn app(server: &ServerGuard) -> axum::Router {
        let config = Config {
            odoo: defaults_for(server),
            ..Config::default()
        };
        router(AppState::new(session(), config))
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let server = mockito::Server::new_async().await;
        let app = app(&server);

        let (status, body) = send(&app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["connected"], false);
        assert!(body["endpoints"]
            .as_array()
            .unwrap()
            .contains(&json!("/search")));

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "healthy", "connected": false, "connection": null})
        );
    }

    #[tokio::test]
    async fn test_operation_before_connect() {
        let server = mockito::Server::new_async().await;
        let app = app(&server);

        let (status, body) = send(&app, post("/search", json!({"model": "res.partner"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["detail"],
            "Not connected to Odoo. Use /connect endpoint first."
        );
    }

    #[tokio::test]
    async fn test_connect_then_count() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<int>2</int>").await;
        let _count = mock_execute(&mut server, "search_count", xml_response("<int>17</int>")).await;
        let app = app(&server);

        let (status, body) = send(&app, post("/connect", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");

        let (_, health) = send(&app, get("/health")).await;
        assert_eq!(health["connected"], true);
        assert_eq!(health["connection"]["database"], "demo");
        assert_eq!(health["connection"]["username"], "admin");
        assert_eq!(health["connection"]["uid"], 2);
        assert!(health["connection"].get("password").is_none());

        let (status, body) = send(&app, post("/count", json!({"model": "res.partner"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "success", "model": "res.partner", "count": 17}));
    }

    #[tokio::test]
    async fn test_create_and_unlink() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<int>2</int>").await;
        let _create = mock_execute(&mut server, "create", xml_response("<int>51</int>")).await;
        let _unlink = mock_execute(&mut server, "unlink", xml_response("<boolean>1</boolean>")).await;
        let app = app(&server);

        send(&app, post("/connect", json!({}))).await;

        let (status, body) = send(
            &app,
            post("/create", json!({"model": "res.partner", "values": {"name": "New"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 51);
        assert_eq!(body["message"], "Created record with ID: 51");

        let (status, body) = send(
            &app,
            post("/unlink", json!({"model": "res.partner", "ids": [51]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], 1);
        assert_eq!(body["result"], true);
    }

    #[tokio::test]
    async fn test_remote_fault_is_500() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<int>2</int>").await;
        let _fields = mock_execute(&mut server, "fields_get", xml_fault(1, "Object x.y doesn't exist")).await;
        let app = app(&server);

        send(&app, post("/connect", json!({}))).await;

        let (status, body) = send(&app, post("/fields", json!({"model": "x.y"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Get fields failed: "));
    }

    #[tokio::test]
    async fn test_validation_is_422() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<int>2</int>").await;
        let app = app(&server);

        send(&app, post("/connect", json!({}))).await;

        let (status, body) = send(&app, post("/write", json!({"model": "res.partner", "ids": [], "values": {}}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("ids"));
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server, "<boolean>0</boolean>").await;
        let app = app(&server);

        let (status, body) = send(&app, post("/connect", json!({"password": "wrong"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Connection failed: Authentication failed"));
    }
    fn post_raw(uri: &str, content_type: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    /// Router already connected to `server`
    async fn connected_app(server: &mut ServerGuard) -> axum::Router {
        mock_login(server, "<int>2</int>").await;
        let app = app(server);
        let (status, _) = send(&app, post("/connect", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        app
    }

    #[tokio::test]
    async fn test_search_and_read_bodies() {
        let mut server = mockito::Server::new_async().await;
        let app = connected_app(&mut server).await;
        let _search = mock_execute(&mut server, "search_read", xml_response(partners_xml())).await;
        let _read = mock_execute(&mut server, "read", xml_response(partners_xml())).await;

        let (status, body) = send(
            &app,
            post("/search", json!({"model": "res.partner", "fields": ["name", "email"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["count"], 2);
        assert_eq!(body["records"][1]["name"], "Deco Addict");

        let (status, body) = send(
            &app,
            post("/read", json!({"model": "res.partner", "ids": [7, 8]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["records"][0]["id"], 7);
    }

    #[tokio::test]
    async fn test_null_limit_is_not_sent() {
        let mut server = mockito::Server::new_async().await;
        let app = connected_app(&mut server).await;
        let search = server
            .mock("POST", "/xmlrpc/2/object")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("<string>search_read</string>".to_string()),
                Matcher::Regex(
                    "<struct><member><name>fields</name><value><array><data></data></array></value></member></struct>"
                        .to_string(),
                ),
            ]))
            .with_body(xml_response(partners_xml()))
            .create_async()
            .await;

        let (status, body) = send(
            &app,
            post("/search", json!({"model": "res.partner", "limit": null})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);

        search.assert_async().await;
    }

    #[tokio::test]
    async fn test_write_body() {
        let mut server = mockito::Server::new_async().await;
        let app = connected_app(&mut server).await;
        let _write = mock_execute(&mut server, "write", xml_response("<boolean>1</boolean>")).await;

        let (status, body) = send(
            &app,
            post(
                "/write",
                json!({"model": "res.partner", "ids": [7], "values": {"name": "Renamed"}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "status": "success",
                "updated": 1,
                "result": true,
                "message": "Updated 1 records"
            })
        );
    }

    #[tokio::test]
    async fn test_call_models_and_read_group_bodies() {
        let mut server = mockito::Server::new_async().await;
        let app = connected_app(&mut server).await;
        let _call = mock_execute(&mut server, "name_search", xml_response(name_search_xml())).await;
        let _models = mock_execute(&mut server, "ir.model", xml_response(models_xml())).await;
        let _group = mock_execute(&mut server, "read_group", xml_response(groups_xml())).await;

        let (status, body) = send(
            &app,
            post(
                "/call",
                json!({"model": "res.partner", "method": "name_search", "args": ["Azure"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "success", "result": [[7, "Azure Interior"]]})
        );

        let (status, body) = send(&app, post("/models", json!({"filter": "sale"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["models"][0]["model"], "sale.order");

        let (status, body) = send(
            &app,
            post("/read_group", json!({"model": "crm.lead", "groupby": ["stage_id"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "success", "count": 1, "groups": [{"stage_id_count": 3}]})
        );
    }

    #[tokio::test]
    async fn test_connect_without_params_is_400() {
        let app = router(AppState::new(session(), Config::default()));

        let (status, body) = send(&app, post("/connect", json!({"url": "http://odoo.local"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Missing connection parameters"));
    }

    #[tokio::test]
    async fn test_models_before_connect() {
        let server = mockito::Server::new_async().await;
        let app = app(&server);

        let (status, body) = send(&app, post("/models", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["detail"],
            "Not connected to Odoo. Use /connect endpoint first."
        );
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_json_detail() {
        let server = mockito::Server::new_async().await;
        let app = app(&server);

        let (status, body) = send(&app, post("/create", json!({"values": {"name": "x"}}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("missing field `model`"));

        let (status, body) = send(
            &app,
            post("/create", json!({"model": "res.partner", "values": [1]})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());

        let (status, body) = send(
            &app,
            post("/unlink", json!({"model": "res.partner", "ids": ["7"]})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());

        let (status, body) = send(
            &app,
            post_raw("/count", Some("application/json"), "{\"model\": "),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());

        let (status, body) = send(&app, post_raw("/count", None, "{\"model\": \"res.partner\"}")).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["detail"].is_string());
    }
}
