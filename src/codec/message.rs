//! Typed messages and their field schemas.

use crate::core::MalformedFrame;

use super::frame::{InboundFrame, OutboundFrame, encode};
use super::payload::format_float;
use super::{
    DeviceInfo, DeviceOrientation, HapticEffect, MessageKind, Pose, Quat, Tap, TouchEvent, Vec3,
};

/// One protocol message with a typed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// `TOUCH_DOWN,id,x,y,size,pressure,dx,dy,toolType`
    TouchDown(TouchEvent),
    /// `TOUCH_UP,id,x,y,size,pressure,dx,dy,toolType`
    TouchUp(TouchEvent),
    /// `TOUCH_MOVE,id,x,y,size,pressure,dx,dy,toolType`
    TouchMove(TouchEvent),
    /// `TAP,pointerId,tapCount`
    Tap(Tap),
    /// `TAPCONFIRMED,pointerId,tapCount`
    TapConfirmed(Tap),
    /// `DOUBLETAP,pointerId,tapCount`
    DoubleTap(Tap),
    /// `LONGPRESS,pointerId`
    LongPress {
        /// Pointer id.
        pointer_id: i32,
    },
    /// `FLING,velocityX,velocityY`
    Fling {
        /// Horizontal velocity, px/s.
        velocity_x: f32,
        /// Vertical velocity, px/s.
        velocity_y: f32,
    },
    /// `PINCH_START,currentSpan`
    PinchStart {
        /// Distance between the two pointers, px.
        span: f32,
    },
    /// `PINCH_MOVE,currentSpan`
    PinchMove {
        /// Distance between the two pointers, px.
        span: f32,
    },
    /// `PINCH_END,currentSpan`
    PinchEnd {
        /// Distance between the two pointers, px.
        span: f32,
    },
    /// `ACCELEROMETER,x,y,z`
    Accelerometer(Vec3),
    /// `GRAVITY,x,y,z`
    Gravity(Vec3),
    /// `GYROSCOPE,x,y,z`
    Gyroscope(Vec3),
    /// `LINEAR_ACCELERATION,x,y,z`
    LinearAcceleration(Vec3),
    /// `ROTATION_VECTOR,x,y,z,w`
    RotationVector(Quat),
    /// `GAME_ROTATION_VECTOR,x,y,z,w`
    GameRotationVector(Quat),
    /// `MAGNETIC_FIELD,x,y,z`
    MagneticField(Vec3),
    /// `PROXIMITY,v`
    Proximity(f32),
    /// `AMBIENT_TEMPERATURE,v`
    AmbientTemperature(f32),
    /// `LIGHT,v`
    Light(f32),
    /// `DEVICE_ORIENTATION[,label]`
    DeviceOrientation(Option<DeviceOrientation>),
    /// `ARPOSE,px,py,pz,qx,qy,qz,qw`
    ArPose(Pose),
    /// `DEVICE_INFO,name,widthPx,heightPx,widthIn,heightIn`
    DeviceInfo(DeviceInfo),
    /// `HEARTBEAT`
    Heartbeat,
    /// `WHOAREYOU`
    WhoAreYou,
    /// `HAPTICS_*`
    Haptics(HapticEffect),
}

impl Message {
    /// Kind tag for this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::TouchDown(_) => MessageKind::TouchDown,
            Self::TouchUp(_) => MessageKind::TouchUp,
            Self::TouchMove(_) => MessageKind::TouchMove,
            Self::Tap(_) => MessageKind::Tap,
            Self::TapConfirmed(_) => MessageKind::TapConfirmed,
            Self::DoubleTap(_) => MessageKind::DoubleTap,
            Self::LongPress { .. } => MessageKind::LongPress,
            Self::Fling { .. } => MessageKind::Fling,
            Self::PinchStart { .. } => MessageKind::PinchStart,
            Self::PinchMove { .. } => MessageKind::PinchMove,
            Self::PinchEnd { .. } => MessageKind::PinchEnd,
            Self::Accelerometer(_) => MessageKind::Accelerometer,
            Self::Gravity(_) => MessageKind::Gravity,
            Self::Gyroscope(_) => MessageKind::Gyroscope,
            Self::LinearAcceleration(_) => MessageKind::LinearAcceleration,
            Self::RotationVector(_) => MessageKind::RotationVector,
            Self::GameRotationVector(_) => MessageKind::GameRotationVector,
            Self::MagneticField(_) => MessageKind::MagneticField,
            Self::Proximity(_) => MessageKind::Proximity,
            Self::AmbientTemperature(_) => MessageKind::AmbientTemperature,
            Self::Light(_) => MessageKind::Light,
            Self::DeviceOrientation(_) => MessageKind::DeviceOrientation,
            Self::ArPose(_) => MessageKind::ArPose,
            Self::DeviceInfo(_) => MessageKind::DeviceInfo,
            Self::Heartbeat => MessageKind::Heartbeat,
            Self::WhoAreYou => MessageKind::WhoAreYou,
            Self::Haptics(effect) => match effect {
                HapticEffect::Click => MessageKind::HapticsClick,
                HapticEffect::DoubleClick => MessageKind::HapticsDoubleClick,
                HapticEffect::HeavyClick => MessageKind::HapticsHeavyClick,
                HapticEffect::Tick => MessageKind::HapticsTick,
                HapticEffect::OneShot { .. } => MessageKind::HapticsOneShot,
            },
        }
    }

    /// Field values in schema order.
    pub fn to_fields(&self) -> Vec<String> {
        match self {
            Self::TouchDown(t) | Self::TouchUp(t) | Self::TouchMove(t) => vec![
                t.id.to_string(),
                format_float(t.x),
                format_float(t.y),
                format_float(t.size),
                format_float(t.pressure),
                format_float(t.dx),
                format_float(t.dy),
                t.tool_type.to_string(),
            ],
            Self::Tap(tap) | Self::TapConfirmed(tap) | Self::DoubleTap(tap) => {
                vec![tap.pointer_id.to_string(), tap.tap_count.to_string()]
            }
            Self::LongPress { pointer_id } => vec![pointer_id.to_string()],
            Self::Fling {
                velocity_x,
                velocity_y,
            } => vec![format_float(*velocity_x), format_float(*velocity_y)],
            Self::PinchStart { span } | Self::PinchMove { span } | Self::PinchEnd { span } => {
                vec![format_float(*span)]
            }
            Self::Accelerometer(v)
            | Self::Gravity(v)
            | Self::Gyroscope(v)
            | Self::LinearAcceleration(v)
            | Self::MagneticField(v) => vec3_fields(v),
            Self::RotationVector(q) | Self::GameRotationVector(q) => quat_fields(q),
            Self::Proximity(v) | Self::AmbientTemperature(v) | Self::Light(v) => {
                vec![format_float(*v)]
            }
            Self::DeviceOrientation(label) => {
                label.iter().map(|o| o.label().to_string()).collect()
            }
            Self::ArPose(pose) => {
                let mut fields = vec3_fields(&pose.position);
                fields.extend(quat_fields(&pose.rotation));
                fields
            }
            Self::DeviceInfo(info) => vec![
                info.name.clone(),
                format_float(info.width_px),
                format_float(info.height_px),
                format_float(info.width_in),
                format_float(info.height_in),
            ],
            Self::Heartbeat | Self::WhoAreYou => Vec::new(),
            Self::Haptics(HapticEffect::OneShot {
                duration_ms,
                amplitude,
            }) => vec![duration_ms.to_string(), amplitude.to_string()],
            Self::Haptics(_) => Vec::new(),
        }
    }

    /// Encode as an unstamped line, `<KIND>,<fields...>`.
    pub fn encode(&self) -> String {
        encode(self.kind(), &self.to_fields())
    }

    /// Build an outbound frame stamped with the current time.
    pub fn to_frame(&self) -> OutboundFrame {
        OutboundFrame::new(self.kind(), self.to_fields())
    }

    /// Parse a decoded frame against its kind's schema.
    ///
    /// Extra trailing fields are ignored.
    pub fn from_frame(frame: &InboundFrame) -> Result<Self, MalformedFrame> {
        let kind = frame.kind();
        let f = FieldReader { kind, frame };

        let message = match kind {
            MessageKind::TouchDown => Self::TouchDown(f.touch()?),
            MessageKind::TouchUp => Self::TouchUp(f.touch()?),
            MessageKind::TouchMove => Self::TouchMove(f.touch()?),
            MessageKind::Tap => Self::Tap(f.tap()?),
            MessageKind::TapConfirmed => Self::TapConfirmed(f.tap()?),
            MessageKind::DoubleTap => Self::DoubleTap(f.tap()?),
            MessageKind::LongPress => Self::LongPress {
                pointer_id: f.int(0)?,
            },
            MessageKind::Fling => Self::Fling {
                velocity_x: f.float(0)?,
                velocity_y: f.float(1)?,
            },
            MessageKind::PinchStart => Self::PinchStart { span: f.float(0)? },
            MessageKind::PinchMove => Self::PinchMove { span: f.float(0)? },
            MessageKind::PinchEnd => Self::PinchEnd { span: f.float(0)? },
            MessageKind::Accelerometer => Self::Accelerometer(f.vec3(0)?),
            MessageKind::Gravity => Self::Gravity(f.vec3(0)?),
            MessageKind::Gyroscope => Self::Gyroscope(f.vec3(0)?),
            MessageKind::LinearAcceleration => Self::LinearAcceleration(f.vec3(0)?),
            MessageKind::RotationVector => Self::RotationVector(f.quat(0)?),
            MessageKind::GameRotationVector => Self::GameRotationVector(f.quat(0)?),
            MessageKind::MagneticField => Self::MagneticField(f.vec3(0)?),
            MessageKind::Proximity => Self::Proximity(f.float(0)?),
            MessageKind::AmbientTemperature => Self::AmbientTemperature(f.float(0)?),
            MessageKind::Light => Self::Light(f.float(0)?),
            MessageKind::DeviceOrientation => Self::DeviceOrientation(f.orientation()?),
            MessageKind::ArPose => Self::ArPose(Pose {
                position: f.vec3(0)?,
                rotation: f.quat(3)?,
            }),
            MessageKind::DeviceInfo => Self::DeviceInfo(DeviceInfo {
                name: f.text(0)?.to_string(),
                width_px: f.float(1)?,
                height_px: f.float(2)?,
                width_in: f.float(3)?,
                height_in: f.float(4)?,
            }),
            MessageKind::Heartbeat => Self::Heartbeat,
            MessageKind::WhoAreYou => Self::WhoAreYou,
            MessageKind::HapticsClick => Self::Haptics(HapticEffect::Click),
            MessageKind::HapticsDoubleClick => Self::Haptics(HapticEffect::DoubleClick),
            MessageKind::HapticsHeavyClick => Self::Haptics(HapticEffect::HeavyClick),
            MessageKind::HapticsTick => Self::Haptics(HapticEffect::Tick),
            MessageKind::HapticsOneShot => Self::Haptics(HapticEffect::OneShot {
                duration_ms: f.parse(0)?,
                amplitude: f.int(1)?,
            }),
        };
        Ok(message)
    }
}

fn vec3_fields(v: &Vec3) -> Vec<String> {
    vec![format_float(v.x), format_float(v.y), format_float(v.z)]
}

fn quat_fields(q: &Quat) -> Vec<String> {
    vec![
        format_float(q.x),
        format_float(q.y),
        format_float(q.z),
        format_float(q.w),
    ]
}

/// Positional access to a frame's fields with schema errors.
struct FieldReader<'a> {
    kind: MessageKind,
    frame: &'a InboundFrame,
}

impl FieldReader<'_> {
    fn text(&self, index: usize) -> Result<&str, MalformedFrame> {
        self.frame
            .field(index)
            .ok_or(MalformedFrame::MissingField {
                kind: self.kind,
                index,
            })
    }

    fn parse<T: std::str::FromStr>(&self, index: usize) -> Result<T, MalformedFrame> {
        let raw = self.text(index)?;
        raw.trim().parse().map_err(|_| MalformedFrame::InvalidField {
            kind: self.kind,
            index,
            value: raw.to_string(),
        })
    }

    fn float(&self, index: usize) -> Result<f32, MalformedFrame> {
        self.parse(index)
    }

    fn int(&self, index: usize) -> Result<i32, MalformedFrame> {
        self.parse(index)
    }

    fn vec3(&self, start: usize) -> Result<Vec3, MalformedFrame> {
        Ok(Vec3::new(
            self.float(start)?,
            self.float(start + 1)?,
            self.float(start + 2)?,
        ))
    }

    fn quat(&self, start: usize) -> Result<Quat, MalformedFrame> {
        Ok(Quat::new(
            self.float(start)?,
            self.float(start + 1)?,
            self.float(start + 2)?,
            self.float(start + 3)?,
        ))
    }

    fn touch(&self) -> Result<TouchEvent, MalformedFrame> {
        Ok(TouchEvent {
            id: self.int(0)?,
            x: self.float(1)?,
            y: self.float(2)?,
            size: self.float(3)?,
            pressure: self.float(4)?,
            dx: self.float(5)?,
            dy: self.float(6)?,
            tool_type: self.int(7)?,
        })
    }

    fn tap(&self) -> Result<Tap, MalformedFrame> {
        Ok(Tap {
            pointer_id: self.int(0)?,
            tap_count: self.int(1)?,
        })
    }

    /// Absent or empty label means "no orientation yet".
    fn orientation(&self) -> Result<Option<DeviceOrientation>, MalformedFrame> {
        match self.frame.field(0).map(str::trim) {
            None | Some("") => Ok(None),
            Some(label) => label
                .parse()
                .map(Some)
                .map_err(|_| MalformedFrame::InvalidField {
                    kind: self.kind,
                    index: 0,
                    value: label.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::frame::decode;

    fn round_trip(message: &Message) -> Message {
        let line = message.to_frame().to_line();
        Message::from_frame(&decode(&line).unwrap()).unwrap()
    }

    fn sample_messages() -> Vec<Message> {
        let touch = TouchEvent {
            id: 1,
            x: 540.5,
            y: 1200.0,
            size: 0.12,
            pressure: 0.8,
            dx: -3.25,
            dy: 4.0,
            tool_type: 1,
        };
        vec![
            Message::TouchDown(touch),
            Message::TouchUp(touch),
            Message::TouchMove(touch),
            Message::Tap(Tap {
                pointer_id: 0,
                tap_count: 3,
            }),
            Message::TapConfirmed(Tap {
                pointer_id: 0,
                tap_count: 1,
            }),
            Message::DoubleTap(Tap {
                pointer_id: 2,
                tap_count: 2,
            }),
            Message::LongPress { pointer_id: 4 },
            Message::Fling {
                velocity_x: 2500.0,
                velocity_y: -120.5,
            },
            Message::PinchStart { span: 300.0 },
            Message::PinchMove { span: 320.75 },
            Message::PinchEnd { span: 400.0 },
            Message::Accelerometer(Vec3::new(0.1, 9.8, -0.2)),
            Message::Gravity(Vec3::new(0.0, 9.80665, 0.0)),
            Message::Gyroscope(Vec3::new(1.0e-4, -0.5, 0.25)),
            Message::LinearAcceleration(Vec3::new(0.0, 0.0, 0.0)),
            Message::RotationVector(Quat::new(0.1, 0.2, 0.3, 0.9)),
            Message::GameRotationVector(Quat::IDENTITY),
            Message::MagneticField(Vec3::new(22.5, -5.0, -40.0)),
            Message::Proximity(5.0),
            Message::AmbientTemperature(21.5),
            Message::Light(320.0),
            Message::DeviceOrientation(Some(DeviceOrientation::PortraitUpsideDown)),
            Message::DeviceOrientation(None),
            Message::ArPose(Pose {
                position: Vec3::new(0.5, 1.5, -2.0),
                rotation: Quat::new(0.0, 0.7071, 0.0, 0.7071),
            }),
            Message::DeviceInfo(DeviceInfo {
                name: "Google Pixel 8".into(),
                width_px: 1080.0,
                height_px: 2400.0,
                width_in: 2.5,
                height_in: 5.6,
            }),
            Message::Heartbeat,
            Message::WhoAreYou,
            Message::Haptics(HapticEffect::Click),
            Message::Haptics(HapticEffect::DoubleClick),
            Message::Haptics(HapticEffect::HeavyClick),
            Message::Haptics(HapticEffect::Tick),
            Message::Haptics(HapticEffect::OneShot {
                duration_ms: 250,
                amplitude: 128,
            }),
        ]
    }

    #[test]
    fn test_every_kind_round_trips() {
        let messages = sample_messages();
        for kind in MessageKind::ALL {
            assert!(
                messages.iter().any(|m| m.kind() == kind),
                "no sample for {kind}"
            );
        }
        for message in &messages {
            assert_eq!(&round_trip(message), message);
        }
    }

    #[test]
    fn test_field_counts_match_schema() {
        for message in sample_messages() {
            if message == Message::DeviceOrientation(None) {
                continue;
            }
            assert_eq!(message.to_fields().len(), message.kind().field_count());
        }
    }

    #[test]
    fn test_accelerometer_encoding() {
        let message = Message::Accelerometer(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(message.encode(), "ACCELEROMETER,1.0,2.0,3.0");
    }

    #[test]
    fn test_touch_encoding_order() {
        let message = Message::TouchDown(TouchEvent {
            id: 3,
            x: 10.0,
            y: 20.0,
            size: 0.5,
            pressure: 1.0,
            dx: 0.0,
            dy: 0.0,
            tool_type: 2,
        });
        assert_eq!(message.encode(), "TOUCH_DOWN,3,10.0,20.0,0.5,1.0,0.0,0.0,2");
    }

    #[test]
    fn test_missing_field_is_reported() {
        let frame = decode("ACCELEROMETER,1.0,2.0").unwrap();
        assert_eq!(
            Message::from_frame(&frame),
            Err(MalformedFrame::MissingField {
                kind: MessageKind::Accelerometer,
                index: 2,
            })
        );
    }

    #[test]
    fn test_invalid_field_is_reported() {
        let frame = decode("TAP,zero,1").unwrap();
        assert!(matches!(
            Message::from_frame(&frame),
            Err(MalformedFrame::InvalidField { index: 0, .. })
        ));
    }

    #[test]
    fn test_extra_trailing_fields_accepted() {
        let frame = decode("LIGHT,12.5,future,fields").unwrap();
        assert_eq!(Message::from_frame(&frame), Ok(Message::Light(12.5)));
    }

    #[test]
    fn test_orientation_label_optional() {
        let frame = decode("DEVICE_ORIENTATION").unwrap();
        assert_eq!(
            Message::from_frame(&frame),
            Ok(Message::DeviceOrientation(None))
        );
        let frame = decode("DEVICE_ORIENTATION,").unwrap();
        assert_eq!(
            Message::from_frame(&frame),
            Ok(Message::DeviceOrientation(None))
        );
        let frame = decode("DEVICE_ORIENTATION,SIDEWAYS").unwrap();
        assert!(Message::from_frame(&frame).is_err());
    }

    #[test]
    fn test_haptics_oneshot_from_host() {
        let frame = decode("HAPTICS_ONESHOT,300,255").unwrap();
        assert_eq!(
            Message::from_frame(&frame),
            Ok(Message::Haptics(HapticEffect::OneShot {
                duration_ms: 300,
                amplitude: 255
            }))
        );
    }
}
