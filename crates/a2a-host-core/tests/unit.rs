#[cfg(test)]
mod tests {
    use a2a_host_core::{
        ChatResponse, Content, Event, FunctionCall, FunctionResponse, HealthResponse, ServiceInfo,
        SessionKey, StreamFrame, ToolCall, ToolResponse,
    };
    use serde_json::json;

    #[test]
    fn test_user_message_shape() {
        let content = Content::user_text("Find me an Airbnb in San Francisco");
        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            json!({"role": "user", "parts": [{"text": "Find me an Airbnb in San Francisco"}]})
        );
    }

    #[test]
    fn test_runtime_event_classification() {
        let raw = r#"{
            "author": "routing_agent",
            "content": {"role": "model", "parts": [
                {"text": "Asking the weather agent."},
                {"functionCall": {"id": "c-7", "name": "send_message", "args": {"agent_name": "Weather Agent"}}}
            ]},
            "partial": false
        }"#;
        let event = Event::from_json(raw).unwrap();

        assert!(!event.is_final_response());
        let call = ToolCall::from_function_call(event.function_calls().next().unwrap());
        assert_eq!(call.arguments["id"], "c-7");
        assert_eq!(call.arguments["args"]["agent_name"], "Weather Agent");
    }

    #[test]
    fn test_tool_response_unwrapping() {
        let nested = FunctionResponse::new("send_message", json!({"response": "X", "other": "Y"}));
        assert_eq!(ToolResponse::from_function_response(&nested).response, json!("X"));

        let whole = FunctionResponse::new("send_message", json!({"result": "Z"}));
        assert_eq!(
            ToolResponse::from_function_response(&whole).response,
            json!({"result": "Z"})
        );

        let scalar = FunctionResponse::new("send_message", json!("plain"));
        assert_eq!(ToolResponse::from_function_response(&scalar).response, json!("plain"));
    }

    #[test]
    fn test_tool_call_without_args() {
        let call = ToolCall::from_function_call(&FunctionCall::new("list_agents"));
        assert_eq!(call.arguments, json!({"name": "list_agents"}));
    }

    #[test]
    fn test_chat_response_serialization() {
        let response = ChatResponse {
            response: "It is sunny.".into(),
            ..ChatResponse::default()
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"response": "It is sunny.", "tool_calls": [], "tool_responses": []})
        );

        let parsed: ChatResponse = serde_json::from_str(r#"{"response": "ok"}"#).unwrap();
        assert!(parsed.tool_calls.is_empty());
    }

    #[test]
    fn test_stream_frame_wire_form() {
        let frame = StreamFrame::from_json(r#"{"type":"final_response","response":"Done"}"#).unwrap();
        assert_eq!(frame, StreamFrame::final_response("Done"));
        assert!(StreamFrame::from_json(r#"{"type":"final_response"}"#).is_err());
    }

    #[test]
    fn test_service_records() {
        assert_eq!(
            serde_json::to_value(HealthResponse::healthy()).unwrap(),
            json!({"status": "healthy", "service": "a2a-host-agent", "version": "1.0.0"})
        );

        let info = ServiceInfo::default();
        assert_eq!(info.endpoints["health"], "/health");
        assert_eq!(info.endpoints["chat"], "/chat");
        assert_eq!(info.endpoints["chat_stream"], "/chat/stream");
    }

    #[test]
    fn test_session_key_display() {
        let key = SessionKey::new("routing_app", "u1", "s1");
        assert_eq!(key.to_string(), "routing_app/u1/s1");
        assert_eq!(SessionKey::default().session_id, "default_session");
    }
}
