use winnow::ModalResult;
use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, cut_err, opt, preceded, repeat, separated};
use winnow::error::{StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use crate::ast::{Element, Group, IndexItem, IndexList, Op, Programme};
use crate::error::{Error, Result};

/// Parse a complete programme.
///
/// Letters are case-insensitive and whitespace is allowed between any two
/// tokens.
pub fn parse_programme(input: &str) -> Result<Programme> {
    programme.parse(input).map_err(|e| {
        let offset = e.offset();
        let message = if let Some(ctx) = e.inner().context().next() {
            match ctx {
                StrContext::Label(label) => format!("parse error: expected {}", label),
                StrContext::Expected(StrContextValue::Description(desc)) => {
                    format!("parse error: expected {}", desc)
                }
                _ => "parse error: unexpected character".to_string(),
            }
        } else {
            "parse error: unexpected character".to_string()
        };
        Error::syntax(message, offset)
    })
}

/// Parser for the full programme.
fn programme(input: &mut &str) -> ModalResult<Programme> {
    let elements = repeat(0.., preceded(ws, element)).parse_next(input)?;
    ws.parse_next(input)?;
    Ok(Programme { elements })
}

/// Insignificant whitespace between tokens.
fn ws(input: &mut &str) -> ModalResult<()> {
    multispace0.void().parse_next(input)
}

/// Parser for a single element: a group or an operation.
fn element(input: &mut &str) -> ModalResult<Element> {
    alt((group.map(Element::Group), op.map(Element::Op))).parse_next(input)
}

/// Parser for a group: `(<elements>)` optionally followed by a repeat count.
fn group(input: &mut &str) -> ModalResult<Group> {
    '('.parse_next(input)?;
    let elements = cut_err(repeat(1.., preceded(ws, element)))
        .context(StrContext::Expected(StrContextValue::Description(
            "<command>",
        )))
        .parse_next(input)?;
    cut_err(preceded(ws, ')'))
        .context(StrContext::Expected(StrContextValue::Description(
            "closing ')'",
        )))
        .parse_next(input)?;
    let count = opt(preceded(ws, count)).parse_next(input)?;
    Ok(Group { elements, count })
}

/// Parser for a single operation.
fn op(input: &mut &str) -> ModalResult<Op> {
    alt((counted_op, literal_pad_op, permute_op)).parse_next(input)
}

/// Parser for the operations that take a bit count: `t s r i ri b z n`.
///
/// `ri` is matched as a unit before a plain `r`.
fn counted_op(input: &mut &str) -> ModalResult<Op> {
    let letter = one_of((
        't', 'T', 's', 'S', 'r', 'R', 'i', 'I', 'b', 'B', 'z', 'Z', 'n', 'N',
    ))
    .parse_next(input)?
    .to_ascii_lowercase();
    let inverted = letter == 'r' && opt(one_of(('i', 'I'))).parse_next(input)?.is_some();
    let n = cut_err(preceded(ws, count))
        .context(StrContext::Expected(StrContextValue::Description(
            "<count>",
        )))
        .parse_next(input)?;
    Ok(match letter {
        't' => Op::Take(n),
        's' => Op::Skip(n),
        'r' if inverted => Op::ReverseInvert(n),
        'r' => Op::Reverse(n),
        'i' => Op::Invert(n),
        'b' => Op::Backup(n),
        'z' => Op::ZeroPad(n),
        'n' => Op::OnePad(n),
        _ => unreachable!(),
    })
}

/// Parser for literal padding: `d<binary digits>`
fn literal_pad_op(input: &mut &str) -> ModalResult<Op> {
    one_of(('d', 'D')).parse_next(input)?;
    let digits: &str = cut_err(preceded(ws, take_while(1.., ('0', '1'))))
        .context(StrContext::Expected(StrContextValue::Description(
            "<binary digits>",
        )))
        .parse_next(input)?;
    let bits = digits.bytes().map(|b| b - b'0').collect();
    Ok(Op::LiteralPad(bits))
}

/// Parser for permute: `p<index list>`
fn permute_op(input: &mut &str) -> ModalResult<Op> {
    one_of(('p', 'P')).parse_next(input)?;
    let list = cut_err(index_list)
        .context(StrContext::Expected(StrContextValue::Description(
            "<index list>",
        )))
        .parse_next(input)?;
    Ok(Op::Permute(list))
}

/// Parser for a comma-separated list of indices and ranges.
fn index_list(input: &mut &str) -> ModalResult<IndexList> {
    separated(1.., preceded(ws, index_item), preceded(ws, ','))
        .map(|items| IndexList { items })
        .parse_next(input)
}

/// Parser for a single index or an `a-b` range.
fn index_item(input: &mut &str) -> ModalResult<IndexItem> {
    let start = count.parse_next(input)?;
    let end = opt(preceded(
        (ws, '-'),
        cut_err(preceded(ws, count)).context(StrContext::Expected(
            StrContextValue::Description("<range end>"),
        )),
    ))
    .parse_next(input)?;
    Ok(match end {
        Some(end) => IndexItem::Range { start, end },
        None => IndexItem::Index(start),
    })
}

/// Parser for an unsigned decimal integer.
fn count(input: &mut &str) -> ModalResult<usize> {
    digit1
        .verify_map(|digits: &str| digits.parse::<usize>().ok())
        .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn ops(input: &str) -> Vec<Element> {
        parse_programme(input).unwrap().elements
    }

    #[test]
    fn empty_programme() {
        assert_eq!(ops(""), vec![]);
        assert_eq!(ops(" \t\n"), vec![]);
    }

    #[test]
    fn counted_operators() {
        assert_eq!(
            ops("t4s2r8i1b3z5n6"),
            vec![
                Element::Op(Op::Take(4)),
                Element::Op(Op::Skip(2)),
                Element::Op(Op::Reverse(8)),
                Element::Op(Op::Invert(1)),
                Element::Op(Op::Backup(3)),
                Element::Op(Op::ZeroPad(5)),
                Element::Op(Op::OnePad(6)),
            ]
        );
    }

    #[test]
    fn reverse_invert_is_one_token() {
        assert_eq!(ops("ri8"), vec![Element::Op(Op::ReverseInvert(8))]);
        assert_eq!(
            ops("r2i2"),
            vec![Element::Op(Op::Reverse(2)), Element::Op(Op::Invert(2))]
        );
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(ops("T2S1RI3"), ops("t2s1ri3"));
        assert_eq!(ops("rI3"), vec![Element::Op(Op::ReverseInvert(3))]);
    }

    #[test]
    fn whitespace_between_tokens() {
        assert_eq!(ops("t2\t\ns2\tt2"), ops("t2s2t2"));
        assert_eq!(ops(" t 4 "), vec![Element::Op(Op::Take(4))]);
        assert_eq!(ops("p 1 - 3 , 5"), ops("p1-3,5"));
    }

    #[test]
    fn literal_pad() {
        assert_eq!(ops("d101"), vec![Element::Op(Op::LiteralPad(vec![1, 0, 1]))]);
        assert_eq!(ops("D0"), vec![Element::Op(Op::LiteralPad(vec![0]))]);
    }

    #[test]
    fn permute_list() {
        assert_eq!(
            ops("p1-3,8,6-5"),
            vec![Element::Op(Op::Permute(IndexList {
                items: vec![
                    IndexItem::Range { start: 1, end: 3 },
                    IndexItem::Index(8),
                    IndexItem::Range { start: 6, end: 5 },
                ]
            }))]
        );
    }

    #[test]
    fn permute_followed_by_ops() {
        assert_eq!(
            ops("p1,2t4"),
            vec![
                Element::Op(Op::Permute(IndexList {
                    items: vec![IndexItem::Index(1), IndexItem::Index(2)]
                })),
                Element::Op(Op::Take(4)),
            ]
        );
    }

    #[test]
    fn group_with_count() {
        assert_eq!(
            ops("(t2s2)3"),
            vec![Element::Group(Group {
                elements: vec![Element::Op(Op::Take(2)), Element::Op(Op::Skip(2))],
                count: Some(3),
            })]
        );
    }

    #[test]
    fn group_without_count() {
        assert_eq!(
            ops("(t1)s1"),
            vec![
                Element::Group(Group {
                    elements: vec![Element::Op(Op::Take(1))],
                    count: None,
                }),
                Element::Op(Op::Skip(1)),
            ]
        );
    }

    #[test]
    fn nested_groups() {
        assert_eq!(
            ops("((t1)2 s1)2"),
            vec![Element::Group(Group {
                elements: vec![
                    Element::Group(Group {
                        elements: vec![Element::Op(Op::Take(1))],
                        count: Some(2),
                    }),
                    Element::Op(Op::Skip(1)),
                ],
                count: Some(2),
            })]
        );
    }

    #[test]
    fn zero_count_parses() {
        // rejected later when the group is expanded
        assert_eq!(
            ops("(t4)0"),
            vec![Element::Group(Group {
                elements: vec![Element::Op(Op::Take(4))],
                count: Some(0),
            })]
        );
    }

    #[test]
    fn unknown_letter_error() {
        let err = parse_programme("t4x4").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.position.source_pos, Some(2));
    }

    #[test]
    fn missing_count_error() {
        let err = parse_programme("t").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.message, "parse error: expected <count>");
    }

    #[test]
    fn unterminated_group_error() {
        let err = parse_programme("(t4").unwrap_err();
        assert_eq!(err.message, "parse error: expected closing ')'");
    }

    #[test]
    fn unbalanced_close_error() {
        let err = parse_programme("t4)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.position.source_pos, Some(2));
    }

    #[test]
    fn empty_group_error() {
        assert!(parse_programme("()2").is_err());
    }

    #[test]
    fn malformed_range_error() {
        let err = parse_programme("p1-").unwrap_err();
        assert_eq!(err.message, "parse error: expected <range end>");
    }

    #[test]
    fn trailing_comma_error() {
        assert!(parse_programme("p1,").is_err());
    }

    #[test]
    fn missing_index_list_error() {
        let err = parse_programme("p").unwrap_err();
        assert_eq!(err.message, "parse error: expected <index list>");
    }

    #[test]
    fn bad_binary_literal_error() {
        let err = parse_programme("d2").unwrap_err();
        assert_eq!(err.message, "parse error: expected <binary digits>");
    }

    #[test]
    fn split_reverse_invert_error() {
        assert!(parse_programme("r i4").is_err());
    }

    #[test]
    fn overflowing_count_error() {
        assert!(parse_programme("t99999999999999999999999999").is_err());
    }
}
