use std::sync::Mutex;

use serde_json::json;

use super::*;

#[derive(Default)]
struct Recorder(Mutex<Vec<(String, Value)>>);

impl EventSink for Recorder {
    fn send_sync(&self, event: &str, data: Value) -> CanvasResult<()> {
        self.0.lock().unwrap().push((event.to_string(), data));
        Ok(())
    }
}

#[test]
fn window_id_is_second_widget_of_first_canvas_node() {
    let info = json!({
        "workflow": {
            "nodes": [
                { "type": "LoadImage", "widgets_values": ["a.png", "x"] },
                { "type": "WebCanvasNodePro", "widgets_values": [false, "win-42"] },
                { "type": "WebCanvasNodePro", "widgets_values": [false, "win-99"] }
            ]
        }
    });
    assert_eq!(resolve_window_id(&info).unwrap(), json!("win-42"));
}

#[test]
fn missing_window_id_is_configuration_error() {
    for info in [
        json!({}),
        json!({ "workflow": { "nodes": [] } }),
        json!({ "workflow": { "nodes": [{ "type": "WebCanvasNodePro", "widgets_values": [true] }] } }),
        json!({ "workflow": { "nodes": [{ "type": "WebCanvasNodePro", "widgets_values": [true, null] }] } }),
    ] {
        assert!(matches!(
            resolve_window_id(&info),
            Err(CanvasError::Configuration(_))
        ));
    }
}

#[test]
fn request_edit_sends_full_message() {
    let artifacts = PublishedArtifacts {
        back_url: "/view?filename=back_5.png&subfolder=web_canvas_pro".to_string(),
        layers: vec![LayerMeta {
            url: "/view?filename=fore_5_0.png&subfolder=web_canvas_pro".to_string(),
            index: 0,
            name: "Layer 1".to_string(),
            visible: true,
            opacity: 1.0,
        }],
        files: vec![],
    };
    let bg = Tensor::zeros(vec![1, 30, 40, 3]);
    let msg = ShowCanvasMessage::new(&artifacts, SeedToken::Random(5), &bg, json!(123));

    let sink = Recorder::default();
    request_edit(&sink, &msg).unwrap();

    let sent = sink.0.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (event, data) = &sent[0];
    assert_eq!(event, SHOW_CANVAS_EVENT);
    assert_eq!(
        data,
        &json!({
            "back_image": "/view?filename=back_5.png&subfolder=web_canvas_pro",
            "fore_image": "/view?filename=fore_5_0.png&subfolder=web_canvas_pro",
            "layers": [{
                "url": "/view?filename=fore_5_0.png&subfolder=web_canvas_pro",
                "index": 0,
                "name": "Layer 1",
                "visible": true,
                "opacity": 1.0
            }],
            "seed": 5,
            "canvas_width": 40,
            "canvas_height": 30,
            "window_id": 123
        })
    );
}
