//! Work done on an accepted tree before it is handed back.

use knot_diagnostic::ErrorKind;
use knot_ir::{Node, Symbol, Token, TokenKind, TokenSource};
use tracing::debug;

use crate::annotations::AnnotationBuffer;
use crate::driver::{owned_text, Failure};
use crate::options::StartRule;

/// Attach the pragmas, check single-statement input, wrap in the encoding
/// declaration. Any failure drops the tree.
pub(crate) fn finish<S>(
    source: &S,
    mut tree: Node,
    annotations: AnnotationBuffer,
    start: StartRule,
) -> Result<Node, Failure>
where
    S: TokenSource + ?Sized,
{
    if tree.is_symbol(Symbol::FileInput) {
        attach_annotations(&mut tree, annotations)?;
    } else if !annotations.is_empty() {
        debug!(count = annotations.len(), "dropping annotations outside file input");
    }

    if start == StartRule::Single && has_trailing_code(source.remaining_input()) {
        debug!(line = source.line(), "more than one statement in single input");
        return Err(Failure::new(ErrorKind::MalformedSingleStatement));
    }

    match source.detected_encoding() {
        Some(encoding) => wrap_encoding(tree, encoding),
        None => Ok(tree),
    }
}

/// Hang every annotation off the module's end marker, in buffer order.
fn attach_annotations(tree: &mut Node, annotations: AnnotationBuffer) -> Result<(), Failure> {
    let Some(end) = tree
        .last_child_mut()
        .filter(|child| child.is_token(TokenKind::EndMarker))
    else {
        return Err(Failure::new(ErrorKind::InternalInvariantViolation));
    };
    for annotation in annotations.drain_in_order() {
        let token = Token::new(TokenKind::TypeIgnore, annotation.text, annotation.line, Some(0));
        end.try_push_child(Node::leaf(token))?;
    }
    Ok(())
}

/// Whether `rest` holds anything besides whitespace and comments.
pub(crate) fn has_trailing_code(rest: &str) -> bool {
    let mut bytes = rest.bytes();
    while let Some(b) = bytes.next() {
        match b {
            b' ' | b'\t' | b'\n' | b'\r' | b'\x0C' => {}
            b'#' => {
                for b in bytes.by_ref() {
                    if b == b'\n' {
                        break;
                    }
                }
            }
            _ => return true,
        }
    }
    false
}

fn wrap_encoding(tree: Node, encoding: &str) -> Result<Node, Failure> {
    let mut decl = Node::branch(Symbol::EncodingDecl, 0, None);
    decl.text = Some(owned_text(encoding)?);
    decl.try_push_child(tree)?;
    debug!(encoding, "wrapped in encoding declaration");
    Ok(decl)
}
