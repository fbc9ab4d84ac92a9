use crate::error::CodecError;

/// Field names of the PPG key/value protocol, in wire order.
const PPG_KEYS: [&str; 7] = ["IR", "RED", "IR_AC", "IR_DC", "RED_AC", "RED_DC", "R"];

/// Wire variant of one sensor stream. The arity is fixed per stream and
/// known up front; the assembler never emits a record with any other
/// field count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamProtocol {
    /// MAX30102-style `KEY=VALUE` tokens (`IR=50123,RED=45210,...`).
    PpgKeyValue,
    /// Six positional floats: accelerometer and gyroscope axes.
    ImuPositional,
    /// Eight positional floats: axes plus acceleration/gyro magnitudes.
    ImuPositionalWithMagnitudes,
}

impl StreamProtocol {
    pub const fn arity(self) -> usize {
        match self {
            Self::PpgKeyValue => 7,
            Self::ImuPositional => 6,
            Self::ImuPositionalWithMagnitudes => 8,
        }
    }

    pub(crate) fn parse(self, fields: &[&str]) -> Result<Record, CodecError> {
        if fields.len() != self.arity() {
            return Err(CodecError::InvalidArity {
                expected: self.arity(),
                found: fields.len(),
            });
        }

        match self {
            Self::PpgKeyValue => Ok(Record::Ppg(PpgRecord::parse(fields)?)),
            Self::ImuPositional => Ok(Record::Imu(ImuRecord::parse(fields, false)?)),
            Self::ImuPositionalWithMagnitudes => Ok(Record::Imu(ImuRecord::parse(fields, true)?)),
        }
    }
}

/// One complete record emitted by the assembler.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Ppg(PpgRecord),
    Imu(ImuRecord),
}

/// One photodiode reading with the on-sensor AC/DC decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PpgRecord {
    pub ir: f64,
    pub red: f64,
    pub ir_ac: f64,
    pub ir_dc: f64,
    pub red_ac: f64,
    pub red_dc: f64,
    pub r: f64,
}

impl PpgRecord {
    /// Off-finger or saturated frames report non-positive photodiode counts.
    pub fn is_valid(&self) -> bool {
        self.ir > 0.0 && self.red > 0.0
    }

    fn parse(fields: &[&str]) -> Result<Self, CodecError> {
        let mut values = [0.0_f64; 7];

        for (slot, key) in PPG_KEYS.into_iter().enumerate() {
            let value = fields
                .iter()
                .find_map(|field| {
                    let (k, v) = field.split_once('=')?;
                    k.trim().eq_ignore_ascii_case(key).then_some(v)
                })
                .ok_or(CodecError::MissingKey(key))?;

            values[slot] = parse_float(value)?;
        }

        Ok(Self {
            ir: values[0],
            red: values[1],
            ir_ac: values[2],
            ir_dc: values[3],
            red_ac: values[4],
            red_dc: values[5],
            r: values[6],
        })
    }
}

/// One 6-axis IMU reading, optionally with precomputed signal-vector
/// magnitudes (the 8-field wire variant).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuRecord {
    pub acc_x: f64,
    pub acc_y: f64,
    pub acc_z: f64,
    pub gyr_x: f64,
    pub gyr_y: f64,
    pub gyr_z: f64,
    pub acc_magnitude: Option<f64>,
    pub gyr_magnitude: Option<f64>,
}

impl ImuRecord {
    fn parse(fields: &[&str], with_magnitudes: bool) -> Result<Self, CodecError> {
        let mut values = Vec::with_capacity(fields.len());
        for field in fields {
            values.push(parse_float(field)?);
        }

        Ok(Self {
            acc_x: values[0],
            acc_y: values[1],
            acc_z: values[2],
            gyr_x: values[3],
            gyr_y: values[4],
            gyr_z: values[5],
            acc_magnitude: with_magnitudes.then(|| values[6]),
            gyr_magnitude: with_magnitudes.then(|| values[7]),
        })
    }
}

fn parse_float(token: &str) -> Result<f64, CodecError> {
    token
        .trim()
        .parse::<f64>()
        .map_err(|_| CodecError::InvalidNumber(token.trim().to_string()))
}
