use crate::error::{BvhError, FormatError};
use crate::types::*;
use regex::Regex;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    line: usize,
}

/// Whitespace-delimited tokens of the whole document, each tagged with its 1-based line.
struct Tokens<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    last_line: usize,
}

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\S+").expect("token pattern is valid"))
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let re = token_regex();
        let mut tokens = Vec::new();
        let mut last_line = 1;
        for (i, line) in text.lines().enumerate() {
            last_line = i + 1;
            tokens.extend(re.find_iter(line).map(|m| Token {
                text: m.as_str(),
                line: i + 1,
            }));
        }
        Tokens {
            tokens,
            pos: 0,
            last_line,
        }
    }

    fn next(&mut self, expected: &str) -> Result<Token<'a>, FormatError> {
        match self.tokens.get(self.pos) {
            Some(&token) => {
                self.pos += 1;
                Ok(token)
            }
            None => Err(FormatError::new(
                self.last_line,
                format!("unexpected end of input, expected {}", expected),
            )),
        }
    }

    fn expect(&mut self, keyword: &str) -> Result<Token<'a>, FormatError> {
        let token = self.next(&format!("`{}`", keyword))?;
        if token.text != keyword {
            return Err(FormatError::new(
                token.line,
                format!("expected `{}`, found `{}`", keyword, token.text),
            ));
        }
        Ok(token)
    }

    fn number<T: FromStr>(&mut self, what: &str) -> Result<T, FormatError> {
        let token = self.next(what)?;
        parse_number(token, what)
    }

    fn float(&mut self, what: &str) -> Result<f64, FormatError> {
        let token = self.next(what)?;
        parse_float(token, what)
    }

    fn position(&mut self, what: &str) -> Result<Position, FormatError> {
        let x = self.float(what)?;
        let y = self.float(what)?;
        let z = self.float(what)?;
        Ok(Position::new(x, y, z))
    }

    fn remaining(&self) -> &[Token<'a>] {
        &self.tokens[self.pos..]
    }
}

fn parse_number<T: FromStr>(token: Token, what: &str) -> Result<T, FormatError> {
    token
        .text
        .parse::<T>()
        .map_err(|_| FormatError::new(token.line, format!("invalid {}: `{}`", what, token.text)))
}

/// Like `parse_number` but NaN and infinities are rejected too.
fn parse_float(token: Token, what: &str) -> Result<f64, FormatError> {
    match parse_number::<f64>(token, what)? {
        value if value.is_finite() => Ok(value),
        _ => Err(FormatError::new(
            token.line,
            format!("invalid {}: `{}`", what, token.text),
        )),
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Deepest `JOINT` nesting accepted; the descent is recursive.
pub const MAX_HIERARCHY_DEPTH: Depth = 1024;

/// Parse the block following `ROOT`/`JOINT` (name, braces and body) and push the joint and its
/// subtree onto `joints` in pre-order.
/// `channel_start` is the first free motion column; the next free column is returned.
fn parse_joint(
    tokens: &mut Tokens,
    joints: &mut Vec<Joint>,
    parent: Option<Index>,
    depth: Depth,
    channel_start: Index,
) -> Result<Index, FormatError> {
    let name_token = tokens.next("joint name")?;
    if depth > MAX_HIERARCHY_DEPTH {
        return Err(FormatError::new(
            name_token.line,
            format!("hierarchy nested deeper than {} joints", MAX_HIERARCHY_DEPTH),
        ));
    }
    if name_token.text == "{" {
        return Err(FormatError::new(name_token.line, "missing joint name"));
    }
    let name = name_token.text.to_string();

    //// Register the joint before its children so the arena stays in pre-order
    let index = joints.len();
    joints.push(Joint {
        name,
        index,
        parent,
        depth,
        offset: Position::new(0.0, 0.0, 0.0),
        channels: Vec::new(),
        channel_start,
        children: Vec::new(),
        is_end_site: false,
    });
    if let Some(parent) = parent {
        joints[parent].children.push(index);
    }

    tokens.expect("{")?;

    let mut offset: Option<Position> = None;
    let mut has_channels = false;
    let mut has_end_site = false;
    let mut next_start = channel_start;

    let closing_line = loop {
        let token = tokens.next(&format!("`}}` closing joint `{}`", joints[index].name))?;
        match token.text {
            "OFFSET" => {
                if offset.is_some() {
                    return Err(duplicate(token, "OFFSET", &joints[index].name));
                }
                offset = Some(tokens.position("OFFSET value")?);
            }
            "CHANNELS" => {
                if has_channels {
                    return Err(duplicate(token, "CHANNELS", &joints[index].name));
                }
                let count: usize = tokens.number("channel count")?;
                let mut channels = Vec::with_capacity(count.min(6));
                for _ in 0..count {
                    let channel_token = tokens.next("channel name")?;
                    let channel = Channel::from_name(channel_token.text).ok_or_else(|| {
                        FormatError::new(
                            channel_token.line,
                            format!("unknown channel `{}`", channel_token.text),
                        )
                    })?;
                    channels.push(channel);
                }
                next_start = channel_start + count;
                joints[index].channels = channels;
                has_channels = true;
            }
            "JOINT" => {
                if !has_channels {
                    return Err(FormatError::new(
                        token.line,
                        format!(
                            "joint `{}` declares child joints before its CHANNELS",
                            joints[index].name
                        ),
                    ));
                }
                next_start = parse_joint(tokens, joints, Some(index), depth + 1, next_start)?;
            }
            "End" => {
                if has_end_site {
                    return Err(duplicate(token, "End Site", &joints[index].name));
                }
                if !has_channels {
                    return Err(FormatError::new(
                        token.line,
                        format!(
                            "joint `{}` declares its End Site before its CHANNELS",
                            joints[index].name
                        ),
                    ));
                }
                tokens.expect("Site")?;
                parse_end_site(tokens, joints, index, depth + 1, next_start)?;
                has_end_site = true;
            }
            "}" => break token.line,
            other => {
                return Err(FormatError::new(
                    token.line,
                    format!("unexpected `{}` in joint `{}`", other, joints[index].name),
                ));
            }
        }
    };

    let offset = offset.ok_or_else(|| {
        FormatError::new(
            closing_line,
            format!("joint `{}` has no OFFSET", joints[index].name),
        )
    })?;
    if !has_channels {
        return Err(FormatError::new(
            closing_line,
            format!("joint `{}` has no CHANNELS", joints[index].name),
        ));
    }
    joints[index].offset = offset;

    log::trace!(
        "joint `{}` (depth {}): {} channels starting at {}",
        joints[index].name,
        depth,
        joints[index].channels.len(),
        channel_start
    );
    Ok(next_start)
}

/// `End Site { OFFSET x y z }` becomes a zero-channel leaf.
fn parse_end_site(
    tokens: &mut Tokens,
    joints: &mut Vec<Joint>,
    parent: Index,
    depth: Depth,
    channel_start: Index,
) -> Result<(), FormatError> {
    tokens.expect("{")?;
    tokens.expect("OFFSET")?;
    let offset = tokens.position("End Site OFFSET value")?;
    tokens.expect("}")?;

    let index = joints.len();
    joints.push(Joint {
        name: END_SITE_NAME.to_string(),
        index,
        parent: Some(parent),
        depth,
        offset,
        channels: Vec::new(),
        channel_start,
        children: Vec::new(),
        is_end_site: true,
    });
    joints[parent].children.push(index);
    Ok(())
}

fn duplicate(token: Token, what: &str, joint: &str) -> FormatError {
    FormatError::new(
        token.line,
        format!("joint `{}` declares {} more than once", joint, what),
    )
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Read the MOTION section. Each frame is one line holding exactly `num_channels` values.
fn parse_motion(tokens: &mut Tokens, num_channels: usize) -> Result<Motion, FormatError> {
    tokens.expect("MOTION")?;
    tokens.expect("Frames:")?;
    let num_frames: usize = tokens.number("frame count")?;
    tokens.expect("Frame")?;
    let time_token = tokens.expect("Time:")?;
    let frame_time = tokens.float("frame time")?;

    let mut data: Vec<f64> = Vec::with_capacity(tokens.remaining().len());
    let mut frames_read = 0;

    let remaining = tokens.remaining();
    let mut rows = remaining.chunk_by(|a, b| a.line == b.line).peekable();
    // values that share the `Frame Time:` line are not a motion row
    if let Some(row) = rows.peek() {
        if row[0].line == time_token.line {
            return Err(FormatError::new(
                row[0].line,
                format!("unexpected `{}` after frame time", row[0].text),
            ));
        }
    }
    for row in rows {
        let line = row[0].line;
        if frames_read == num_frames {
            return Err(FormatError::new(
                line,
                format!("found more motion rows than the declared {} frames", num_frames),
            ));
        }
        if row.len() != num_channels {
            return Err(FormatError::new(
                line,
                format!(
                    "frame {} has {} values, expected {}",
                    frames_read,
                    row.len(),
                    num_channels
                ),
            ));
        }
        for &token in row {
            data.push(parse_float(token, "motion value")?);
        }
        frames_read += 1;
    }

    if frames_read != num_frames && num_channels > 0 {
        return Err(FormatError::new(
            tokens.last_line,
            format!("expected {} frames, found {}", num_frames, frames_read),
        ));
    }

    Ok(Motion {
        num_frames,
        num_channels,
        frame_time,
        data,
    })
}

fn parse_bvh(text: &str) -> Result<(Skeleton, Motion), FormatError> {
    let mut tokens = Tokens::new(text);

    //// HIERARCHY
    tokens.expect("HIERARCHY")?;
    tokens.expect("ROOT")?;
    let mut joints: Vec<Joint> = Vec::new();
    let num_channels = parse_joint(&mut tokens, &mut joints, None, 0, 0)?;
    let skeleton = Skeleton { joints };
    debug_assert_eq!(num_channels, skeleton.num_channels());

    //// MOTION
    let motion = parse_motion(&mut tokens, num_channels)?;
    if motion.num_frames == 0 {
        log::warn!("BVH motion section declares 0 frames");
    }
    Ok((skeleton, motion))
}

//////////////////////////////////////////////////////////////// PUBLIC ///////////////////////////////////////////////////////////////////////

/// load a bvh file from a file path
pub fn load_bvh_from_file<P: AsRef<Path>>(file_path: P) -> Result<(Skeleton, Motion), BvhError> {
    let file_path = file_path.as_ref();
    log::debug!("loading bvh file {}", file_path.display());
    let contents = std::fs::read_to_string(file_path)?;
    __load_bvh(&contents)
}

/// load a bvh file from any reader (the whole stream is read before parsing)
pub fn load_bvh_from_reader<R: Read>(mut reader: R) -> Result<(Skeleton, Motion), BvhError> {
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    __load_bvh(&contents)
}

/// load a bvh file from a string
pub fn load_bvh_from_string(bvh_string: &str) -> Result<(Skeleton, Motion), BvhError> {
    __load_bvh(bvh_string)
}

fn __load_bvh(text: &str) -> Result<(Skeleton, Motion), BvhError> {
    let (skeleton, motion) = parse_bvh(text)?;
    log::debug!(
        "parsed bvh: {} joints, {} frames x {} channels",
        skeleton.len(),
        motion.num_frames,
        motion.num_channels
    );
    Ok((skeleton, motion))
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "HIERARCHY\nROOT Hips\n{\n  OFFSET 1 2 3\n  CHANNELS 3 Xposition Yposition Zposition\n}\nMOTION\nFrames: 2\nFrame Time: 0.5\n1 2 3\n4 5 6\n";

    #[test]
    fn tokens_carry_line_numbers() {
        let mut tokens = Tokens::new("  A\tB\r\n\n C ");
        let a = tokens.next("a").unwrap();
        let b = tokens.next("b").unwrap();
        let c = tokens.next("c").unwrap();
        assert_eq!((a.text, a.line), ("A", 1));
        assert_eq!((b.text, b.line), ("B", 1));
        assert_eq!((c.text, c.line), ("C", 3));
        assert!(tokens.next("nothing").is_err());
    }

    #[test]
    fn parses_minimal_document() {
        let (skeleton, motion) = parse_bvh(MINIMAL).unwrap();
        assert_eq!(skeleton.len(), 1);
        assert_eq!(skeleton.root().offset, Position::new(1.0, 2.0, 3.0));
        assert_eq!(motion.num_frames, 2);
        assert_eq!(motion.num_channels, 3);
        assert_eq!(motion.frame_time, 0.5);
        assert_eq!(motion.data, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn short_motion_row_is_reported_on_its_line() {
        let text = MINIMAL.replace("4 5 6", "4 5");
        let err = parse_bvh(&text).unwrap_err();
        assert_eq!(err.line, 11);
        assert!(err.message.contains("has 2 values, expected 3"), "{}", err);
    }

    #[test]
    fn unknown_channel_is_rejected() {
        let text = MINIMAL.replace("Zposition", "Wposition");
        let err = parse_bvh(&text).unwrap_err();
        assert_eq!(err.line, 5);
        assert!(err.message.contains("Wposition"));
    }

    #[test]
    fn values_on_frame_time_line_are_rejected() {
        let text = MINIMAL.replace("Frame Time: 0.5\n", "Frame Time: 0.5 ");
        let err = parse_bvh(&text).unwrap_err();
        assert_eq!(err.line, 9);
    }

    #[test]
    fn non_numeric_motion_value_is_rejected() {
        let text = MINIMAL.replace("4 5 6", "4 five 6");
        let err = parse_bvh(&text).unwrap_err();
        assert!(err.message.contains("`five`"), "{}", err);
    }
}
