use serde_omsi::formats::paths::{PathLink, PathPoint, Paths};
use serde_omsi::formats::Vector3;
use serde_omsi::{from_value, ini, to_string_with_options, to_value, EncodeOptions, LineEnding, Number, Value};

#[test]
fn test_ini_macro_scalars() {
    assert_eq!(ini!(null), Value::Null);
    assert_eq!(ini!(false), Value::Bool(false));
    assert_eq!(ini!(3.5), Value::Number(Number::Float(3.5)));
    assert_eq!(ini!(-123), Value::Number(Number::Integer(-123)));
    assert_eq!(ini!(""), Value::String(String::new()));
}

#[test]
fn test_ini_macro_matches_serialized_command() {
    let point = PathPoint {
        position: Vector3::new(1.0, 2.0, 3.0),
        comments: None,
    };
    let expected = ini!({
        "position": { "x": 1.0, "y": 2.0, "z": 3.0 },
        "comments": null
    });

    let actual = to_value(&point).unwrap();
    assert_eq!(
        serde_json::to_value(&actual).unwrap(),
        serde_json::to_value(&expected).unwrap()
    );
}

#[test]
fn test_dynamic_tree_to_document() {
    let tree = ini!({
        "path": "",
        "step_sounds": [],
        "points": [],
        "links": [
            { "one_way": { "a": 0, "b": 1, "step_sound": 0, "room_height": 0.0, "comments": "; ramp\n" } }
        ],
        "next_room_height": null,
        "next_step_sound": null,
        "comments": null,
        "post_comments": null
    });

    let paths: Paths = from_value(tree).unwrap();
    assert!(matches!(paths.links[0], PathLink::OneWay(_)));

    let options = EncodeOptions::new().with_line_ending(LineEnding::Lf);
    assert_eq!(
        to_string_with_options(&paths, &options).unwrap(),
        "; ramp\n[next_stepsound]\n0\n[next_roomheight]\n0\n[pathlink_oneway]\n0\n1\n"
    );
}

#[test]
fn test_json_view_of_decoded_document() {
    let paths: Paths = serde_omsi::from_str("[pathpnt]\n0\n0.5\n0\n").unwrap();
    let json = serde_json::to_value(to_value(&paths).unwrap()).unwrap();
    assert_eq!(json["points"][0]["position"]["y"], serde_json::json!(0.5));
    assert_eq!(json["links"], serde_json::json!([]));
}
