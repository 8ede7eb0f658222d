use async_trait::async_trait;
use minimvc::binding::{ModelMetadata, ModelState, ValidationRule, ValidationState, BODY_MODEL_STATE_KEY};
use minimvc::filters::{ActionArguments, ActionHandler};
use minimvc::http::{ActionResult, Request};
use minimvc::invoker::{ActionDescriptor, ActionInvoker, InvocationOutcome, ParameterDescriptor};
use minimvc::value_provider::BindingSource;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

/// Echoes the bound arguments back as JSON, or answers 400 when binding left
/// the model invalid.
struct EchoHandler;

#[async_trait]
impl ActionHandler for EchoHandler {
    async fn invoke(&self, arguments: &ActionArguments, model_state: &ModelState) -> ActionResult {
        if !model_state.is_valid() {
            return ActionResult::Status(400);
        }
        let mut object = serde_json::Map::new();
        for (name, value) in arguments {
            object.insert(name.clone(), value.clone());
        }
        ActionResult::Json {
            status: 200,
            value: Value::Object(object),
        }
    }
}

async fn invoke(request: Request, descriptor: &ActionDescriptor) -> InvocationOutcome {
    ActionInvoker::default()
        .invoke(request, descriptor, &[], &EchoHandler, CancellationToken::new())
        .await
        .expect("invocation is not cancelled")
}

fn body_json(outcome: &InvocationOutcome) -> Value {
    serde_json::from_slice(&outcome.response.body).expect("response body is JSON")
}

#[tokio::test]
async fn route_value_binds_and_validates_an_integer_parameter() {
    let descriptor = ActionDescriptor::new("GetWidget")
        .with_parameter(ParameterDescriptor::new("id", ModelMetadata::integer()));
    let request = Request::new("GET", "/widgets/42").with_route_value("id", "42");

    let outcome = invoke(request, &descriptor).await;

    assert_eq!(outcome.response.status, 200);
    assert_eq!(body_json(&outcome), json!({"id": 42}));
    let entry = outcome.model_state.get("id").unwrap();
    assert_eq!(entry.state, ValidationState::Valid);
    assert_eq!(entry.attempted_value.as_deref(), Some("42"));
}

#[tokio::test]
async fn route_values_take_precedence_over_the_query_string() {
    let descriptor = ActionDescriptor::new("GetWidget")
        .with_parameter(ParameterDescriptor::new("id", ModelMetadata::integer()));
    let request = Request::new("GET", "/widgets/1")
        .with_route_value("id", "1")
        .with_query("id", "2");

    let outcome = invoke(request, &descriptor).await;
    assert_eq!(body_json(&outcome), json!({"id": 1}));
}

#[tokio::test]
async fn source_restricted_parameter_binds_from_the_form_only() {
    let descriptor = ActionDescriptor::new("Rename").with_parameter(
        ParameterDescriptor::new("name", ModelMetadata::string())
            .from_source(BindingSource::Form),
    );
    let request = Request::new("POST", "/widgets/1")
        .with_header("content-type", "application/x-www-form-urlencoded")
        .with_query("name", "from-query")
        .with_form("name", "from-form");

    let outcome = invoke(request, &descriptor).await;
    assert_eq!(body_json(&outcome), json!({"name": "from-form"}));
}

#[tokio::test]
async fn complex_parameter_assembles_from_dotted_query_keys() {
    let order = ModelMetadata::object()
        .with_property("total", ModelMetadata::float())
        .with_property("note", ModelMetadata::string());
    let descriptor = ActionDescriptor::new("PlaceOrder")
        .with_parameter(ParameterDescriptor::new("order", order));
    let request = Request::new("GET", "/orders")
        .with_query("order.total", "12.5")
        .with_query("order.note", "rush");

    let outcome = invoke(request, &descriptor).await;
    assert_eq!(
        body_json(&outcome),
        json!({"order": {"total": 12.5, "note": "rush"}})
    );
    assert_eq!(
        outcome.model_state.get("order.total").unwrap().state,
        ValidationState::Valid
    );
}

#[tokio::test]
async fn conversion_failure_yields_an_invalid_model_not_a_crash() {
    let descriptor = ActionDescriptor::new("GetWidget")
        .with_parameter(ParameterDescriptor::new("id", ModelMetadata::integer()));
    let request = Request::new("GET", "/widgets/x").with_route_value("id", "not-a-number");

    let outcome = invoke(request, &descriptor).await;

    // The handler still ran; it chose 400 after consulting model state.
    assert_eq!(outcome.response.status, 400);
    let entry = outcome.model_state.get("id").unwrap();
    assert_eq!(entry.state, ValidationState::Invalid);
    assert_eq!(entry.attempted_value.as_deref(), Some("not-a-number"));
}

#[tokio::test]
async fn json_body_binds_under_the_reserved_key_and_validates_properties() {
    let payload = ModelMetadata::object()
        .with_property("name", ModelMetadata::string().required())
        .with_property(
            "quantity",
            ModelMetadata::integer().with_rule(ValidationRule::Range { min: 1.0, max: 100.0 }),
        );
    let descriptor = ActionDescriptor::new("PlaceOrder").with_parameter(
        ParameterDescriptor::new("payload", payload).from_source(BindingSource::Body),
    );
    let request = Request::new("POST", "/orders")
        .with_body("application/json", r#"{"name": "widget", "quantity": 3}"#);

    let outcome = invoke(request, &descriptor).await;

    assert_eq!(outcome.response.status, 200);
    assert_eq!(
        body_json(&outcome),
        json!({"payload": {"name": "widget", "quantity": 3}})
    );
    assert_eq!(
        outcome.model_state.get(BODY_MODEL_STATE_KEY).unwrap().state,
        ValidationState::Valid
    );
}

#[tokio::test]
async fn body_property_violations_surface_under_dotted_reserved_keys() {
    let payload = ModelMetadata::object()
        .with_property("name", ModelMetadata::string().required())
        .with_property(
            "quantity",
            ModelMetadata::integer().with_rule(ValidationRule::Range { min: 1.0, max: 100.0 }),
        );
    let descriptor = ActionDescriptor::new("PlaceOrder").with_parameter(
        ParameterDescriptor::new("payload", payload).from_source(BindingSource::Body),
    );
    let request =
        Request::new("POST", "/orders").with_body("application/json", r#"{"quantity": 500}"#);

    let outcome = invoke(request, &descriptor).await;

    assert_eq!(outcome.response.status, 400);
    let name = outcome.model_state.get("$body.name").unwrap();
    assert_eq!(name.errors.len(), 1);
    let quantity = outcome.model_state.get("$body.quantity").unwrap();
    assert_eq!(quantity.errors.len(), 1);
    assert_eq!(outcome.model_state.error_count(), 2);
}

#[tokio::test]
async fn unsupported_content_type_invokes_the_handler_without_the_payload() {
    let descriptor = ActionDescriptor::new("PlaceOrder").with_parameter(
        ParameterDescriptor::new("payload", ModelMetadata::object())
            .from_source(BindingSource::Body),
    );
    let request = Request::new("POST", "/orders").with_body("application/xml", "<order/>");

    let outcome = invoke(request, &descriptor).await;

    assert_eq!(outcome.response.status, 400);
    let entry = outcome.model_state.get(BODY_MODEL_STATE_KEY).unwrap();
    assert_eq!(entry.errors.len(), 1);
    assert!(entry.errors[0].message.contains("application/xml"));
}

#[tokio::test]
async fn malformed_json_body_becomes_a_model_error() {
    let descriptor = ActionDescriptor::new("PlaceOrder").with_parameter(
        ParameterDescriptor::new("payload", ModelMetadata::object())
            .from_source(BindingSource::Body),
    );
    let request = Request::new("POST", "/orders").with_body("application/json", "{broken");

    let outcome = invoke(request, &descriptor).await;

    assert_eq!(outcome.response.status, 400);
    assert_eq!(
        outcome.model_state.get(BODY_MODEL_STATE_KEY).unwrap().errors.len(),
        1
    );
}

#[tokio::test]
async fn missing_required_parameter_is_reported_by_name() {
    let descriptor = ActionDescriptor::new("GetWidget")
        .with_parameter(ParameterDescriptor::new("id", ModelMetadata::integer().required()));
    let request = Request::new("GET", "/widgets");

    let outcome = invoke(request, &descriptor).await;

    assert_eq!(outcome.response.status, 400);
    let entry = outcome.model_state.get("id").unwrap();
    assert_eq!(entry.errors[0].message, "A value for 'id' is required.");
}

#[tokio::test]
async fn missing_optional_parameter_stays_absent() {
    let descriptor = ActionDescriptor::new("Search")
        .with_parameter(ParameterDescriptor::new("page", ModelMetadata::integer()));
    let request = Request::new("GET", "/search");

    let outcome = invoke(request, &descriptor).await;

    assert_eq!(outcome.response.status, 200);
    assert_eq!(body_json(&outcome), json!({}));
    assert!(outcome.model_state.is_valid());
}
