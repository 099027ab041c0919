//! Content-stream interpretation: turns text-showing operators into
//! positioned [`TextRun`]s in device space.
//!
//! Font metrics are not consulted. Glyph advances use an average width of
//! half an em, which is close enough to separate words from columns.
//! String bytes are decoded through the encoding of the font selected by
//! `Tf`.

use std::collections::BTreeMap;

use lopdf::content::Operation;
use lopdf::{Document, Object};

/// Average glyph advance, in text-space units per unit of font size.
const AVERAGE_GLYPH_WIDTH: f32 = 0.5;

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    pub fn translate(tx: f32, ty: f32) -> Self {
        Matrix { e: tx, f: ty, ..Self::IDENTITY }
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        match operands {
            [a, b, c, d, e, f] => Some(Matrix {
                a: number(a)?,
                b: number(b)?,
                c: number(c)?,
                d: number(d)?,
                e: number(e)?,
                f: number(f)?,
            }),
            _ => None,
        }
    }

    fn scale_x(&self) -> f32 {
        self.a.hypot(self.b)
    }

    fn scale_y(&self) -> f32 {
        self.c.hypot(self.d)
    }
}

/// A string drawn at one position. `y` grows upward, as in PDF user space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
    pub text: String,
}

impl TextRun {
    pub fn end_x(&self) -> f32 {
        self.x + self.width
    }
}

#[derive(Debug, Clone)]
struct TextState {
    tm: Matrix,
    tlm: Matrix,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
        }
    }
}

/// Font resource name (`/F1`) to its simple-font encoding name.
pub type FontEncodings<'a> = BTreeMap<Vec<u8>, &'a str>;

struct Interpreter<'a> {
    encodings: &'a FontEncodings<'a>,
    encoding: Option<&'a str>,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    state: TextState,
    runs: Vec<TextRun>,
}

/// Walk a page's operations and collect every non-blank string it shows.
pub fn collect_runs(operations: &[Operation], encodings: &FontEncodings<'_>) -> Vec<TextRun> {
    let mut interp = Interpreter {
        encodings,
        encoding: None,
        ctm: Matrix::IDENTITY,
        ctm_stack: Vec::new(),
        state: TextState::default(),
        runs: Vec::new(),
    };
    for op in operations {
        interp.apply(op);
    }
    interp.runs
}

impl Interpreter<'_> {
    fn apply(&mut self, op: &Operation) {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.ctm_stack.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.ctm = m.multiply(&self.ctm);
                }
            }
            "BT" => {
                self.state.tm = Matrix::IDENTITY;
                self.state.tlm = Matrix::IDENTITY;
            }
            "Tf" => {
                if let Some(name) = operands.first().and_then(|o| o.as_name().ok()) {
                    self.encoding = self.encodings.get(name).copied();
                }
                if let Some(size) = operands.get(1).and_then(number) {
                    self.state.font_size = size;
                }
            }
            "Tc" => set_from(operands, &mut self.state.char_spacing),
            "Tw" => set_from(operands, &mut self.state.word_spacing),
            "TL" => set_from(operands, &mut self.state.leading),
            "Tz" => {
                if let Some(scale) = operands.first().and_then(number) {
                    self.state.horizontal_scale = scale / 100.0;
                }
            }
            "Td" => {
                if let [tx, ty] = operands {
                    if let (Some(tx), Some(ty)) = (number(tx), number(ty)) {
                        self.move_line(tx, ty);
                    }
                }
            }
            "TD" => {
                if let [tx, ty] = operands {
                    if let (Some(tx), Some(ty)) = (number(tx), number(ty)) {
                        self.state.leading = -ty;
                        self.move_line(tx, ty);
                    }
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.state.tm = m;
                    self.state.tlm = m;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "'" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "\"" => {
                if let [aw, ac, Object::String(bytes, _)] = operands {
                    if let Some(aw) = number(aw) {
                        self.state.word_spacing = aw;
                    }
                    if let Some(ac) = number(ac) {
                        self.state.char_spacing = ac;
                    }
                    self.next_line();
                    self.show(bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show(bytes),
                            other => {
                                if let Some(adjust) = number(other) {
                                    let tx = -adjust / 1000.0
                                        * self.state.font_size
                                        * self.state.horizontal_scale;
                                    self.advance(tx);
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.state.tlm = Matrix::translate(tx, ty).multiply(&self.state.tlm);
        self.state.tm = self.state.tlm;
    }

    fn next_line(&mut self) {
        let leading = self.state.leading;
        self.move_line(0.0, -leading);
    }

    fn advance(&mut self, tx: f32) {
        self.state.tm = Matrix::translate(tx, 0.0).multiply(&self.state.tm);
    }

    fn show(&mut self, bytes: &[u8]) {
        let text = decode_pdf_string(bytes, self.encoding);
        let state = &self.state;
        let advance: f32 = text
            .chars()
            .map(|c| {
                let mut w = AVERAGE_GLYPH_WIDTH * state.font_size + state.char_spacing;
                if c == ' ' {
                    w += state.word_spacing;
                }
                w * state.horizontal_scale
            })
            .sum();

        let trm = state.tm.multiply(&self.ctm);
        if !text.trim().is_empty() {
            self.runs.push(TextRun {
                x: trm.e,
                y: trm.f,
                width: advance * trm.scale_x(),
                font_size: (state.font_size * trm.scale_y()).abs(),
                text,
            });
        }
        self.advance(advance);
    }
}

fn set_from(operands: &[Object], slot: &mut f32) {
    if let Some(v) = operands.first().and_then(number) {
        *slot = v;
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Decode a PDF string operand. UTF-16BE when it carries a byte-order mark,
/// otherwise through the font's encoding. With no known font, one byte per
/// character (Latin-1). Composite `Identity` encodings need a ToUnicode map
/// and decode to nothing. Control characters are dropped.
pub fn decode_pdf_string(bytes: &[u8], encoding: Option<&str>) -> String {
    let decoded = if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        match encoding {
            Some("Identity-H" | "Identity-V") => String::new(),
            Some(encoding) => Document::decode_text(Some(encoding), bytes),
            None => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    };
    decoded.chars().filter(|c| !c.is_control()).collect()
}
