use serde::Serialize;
use time::OffsetDateTime;

/// One sensor poll: the color triple from the color sensor and the two
/// temperatures from the IR thermometer. Not retained beyond the cycle
/// that produced it, except inside an emitted event.
///
/// On the wire the temperatures keep their long-standing field names; the
/// poll time is carried by the enclosing event's timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SensorReading {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    #[serde(rename = "object_temperature")]
    pub object_temp: f32,
    #[serde(rename = "ambient_temperature")]
    pub ambient_temp: f32,
    #[serde(skip_serializing)]
    pub time: OffsetDateTime,
}

impl SensorReading {
    pub fn new(red: u8, green: u8, blue: u8, object_temp: f32, ambient_temp: f32) -> Self {
        Self {
            red,
            green,
            blue,
            object_temp,
            ambient_temp,
            time: OffsetDateTime::now_utc(),
        }
    }
}
