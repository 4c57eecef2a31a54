//! literal.rs — Encodage des octets en littéraux C (et relecture)
//!
//! Deux encodages :
//! - **binaire** : entiers hexadécimaux `0x00`..`0xFF` (compacts, rapides à parser) ;
//! - **texte**   : littéraux caractère `'a'`, séquences d’échappement pour les
//!   octets spéciaux/non imprimables, puis l’élément terminateur `'\0'`.
//!
//! `decode` relit une liste `{ ... }` produite par l’un ou l’autre : c’est ce
//! qui garantit le round-trip octet pour octet.

use crate::error::{Error, Result};

/// Indentation des lignes de données.
const INDENT: &str = "  ";

/* ───────────────────────────── Encodage ───────────────────────────── */

/// Liste d’entiers hexadécimaux, `per_line` éléments par ligne.
///
/// Une liste d’initialisation vide n’est pas du C valide : pour une entrée
/// vide on émet un unique `0x00` de remplissage (non compté dans la taille).
#[must_use]
pub fn encode_binary(bytes: &[u8], per_line: usize) -> String {
    if bytes.is_empty() {
        return format!("{{\n{INDENT}0x00, /* padding */\n}}");
    }
    layout(bytes.iter().map(|&b| hex_literal(b)), per_line)
}

/// Liste de littéraux caractère, suivie du terminateur `'\0'`.
#[must_use]
pub fn encode_text(bytes: &[u8], per_line: usize) -> String {
    let tokens = bytes
        .iter()
        .map(|&b| char_literal(b))
        .chain(std::iter::once(char_literal(0)));
    layout(tokens, per_line)
}

/// `0xAB` (majuscules, deux chiffres).
#[must_use]
pub fn hex_literal(b: u8) -> String {
    format!("0x{b:02X}")
}

/// Littéral caractère C pour un octet.
#[must_use]
pub fn char_literal(b: u8) -> String {
    let body = match b {
        0x00 => "\\0".to_owned(),
        0x07 => "\\a".to_owned(),
        0x08 => "\\b".to_owned(),
        b'\t' => "\\t".to_owned(),
        b'\n' => "\\n".to_owned(),
        0x0B => "\\v".to_owned(),
        0x0C => "\\f".to_owned(),
        b'\r' => "\\r".to_owned(),
        b'\'' => "\\'".to_owned(),
        b'\\' => "\\\\".to_owned(),
        0x20..=0x7E => (b as char).to_string(),
        _ => format!("\\x{b:02X}"),
    };
    format!("'{body}'")
}

fn layout(tokens: impl Iterator<Item = String>, per_line: usize) -> String {
    let per_line = per_line.max(1);
    let mut out = String::from("{\n");
    let mut col = 0usize;
    for tok in tokens {
        if col == 0 {
            out.push_str(INDENT);
        } else {
            out.push(' ');
        }
        out.push_str(&tok);
        out.push(',');
        col += 1;
        if col == per_line {
            out.push('\n');
            col = 0;
        }
    }
    if col != 0 {
        out.push('\n');
    }
    out.push('}');
    out
}

/* ───────────────────────────── Relecture ───────────────────────────── */

/// Relit une liste `{ e0, e1, ... }` complète (blancs et commentaires tolérés autour).
///
/// # Errors
/// `Error::Decode`, avec l’offset de l’élément illisible.
pub fn decode(src: &str) -> Result<Vec<u8>> {
    let (values, end) = decode_list(src, 0)?;
    let mut cur = Cursor { src: src.as_bytes(), off: end };
    cur.skip_trivia()?;
    if !cur.is_eof() {
        return Err(cur.error("contenu inattendu après `}`"));
    }
    Ok(values)
}

/// Relit une liste à partir de `start` ; renvoie les valeurs et l’offset après `}`.
pub(crate) fn decode_list(src: &str, start: usize) -> Result<(Vec<u8>, usize)> {
    let mut cur = Cursor { src: src.as_bytes(), off: start };
    cur.skip_trivia()?;
    cur.expect(b'{')?;
    let mut values = Vec::new();
    loop {
        cur.skip_trivia()?;
        if cur.eat(b'}') {
            break;
        }
        values.push(cur.element()?);
        cur.skip_trivia()?;
        if cur.eat(b',') {
            continue;
        }
        cur.expect(b'}')?;
        break;
    }
    Ok((values, cur.off))
}

/// Curseur de lecture sur le texte source (sans alloc).
struct Cursor<'a> {
    src: &'a [u8],
    off: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.off).copied()
    }
    fn peek_at(&self, n: usize) -> Option<u8> {
        self.src.get(self.off + n).copied()
    }
    fn is_eof(&self) -> bool {
        self.off >= self.src.len()
    }
    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.off += 1;
        Some(b)
    }
    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.off += 1;
            true
        } else {
            false
        }
    }
    fn expect(&mut self, b: u8) -> Result<()> {
        if self.eat(b) {
            Ok(())
        } else {
            Err(self.error(format!("`{}` attendu", b as char)))
        }
    }
    fn error(&self, msg: impl Into<String>) -> Error {
        Error::Decode { offset: self.off, msg: msg.into() }
    }

    /// Blancs, `/* ... */` et `// ...`.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b), _) if b.is_ascii_whitespace() => self.off += 1,
                (Some(b'/'), Some(b'*')) => {
                    let start = self.off;
                    self.off += 2;
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (Some(b'*'), Some(b'/')) => {
                                self.off += 2;
                                break;
                            }
                            (Some(_), _) => self.off += 1,
                            (None, _) => {
                                return Err(Error::Decode {
                                    offset: start,
                                    msg: "commentaire non terminé".into(),
                                })
                            }
                        }
                    }
                }
                (Some(b'/'), Some(b'/')) => {
                    while let Some(b) = self.bump() {
                        if b == b'\n' {
                            break;
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn element(&mut self) -> Result<u8> {
        match self.peek() {
            Some(b'\'') => self.char_element(),
            Some(b) if b.is_ascii_digit() => self.int_element(),
            Some(b) => Err(self.error(format!("élément inattendu `{}`", b as char))),
            None => Err(self.error("fin de texte dans la liste")),
        }
    }

    fn int_element(&mut self) -> Result<u8> {
        let start = self.off;
        let (radix, digits_from) = match (self.peek(), self.peek_at(1)) {
            (Some(b'0'), Some(b'x' | b'X')) => (16, self.off + 2),
            (Some(b'0'), Some(b'0'..=b'9')) => (8, self.off + 1),
            _ => (10, self.off),
        };
        self.off = digits_from;
        let mut value: u32 = 0;
        let mut n = 0usize;
        while let Some(d) = self.peek().and_then(|b| (b as char).to_digit(radix)) {
            value = value.saturating_mul(radix).saturating_add(d);
            self.off += 1;
            n += 1;
        }
        // suffixes entiers tolérés (u, U)
        while matches!(self.peek(), Some(b'u' | b'U')) {
            self.off += 1;
        }
        if n == 0 && radix == 16 {
            return Err(Error::Decode { offset: start, msg: "hexadécimal sans chiffres".into() });
        }
        u8::try_from(value).map_err(|_| Error::Decode {
            offset: start,
            msg: format!("valeur {value} hors de 0..=255"),
        })
    }

    fn char_element(&mut self) -> Result<u8> {
        let start = self.off;
        self.expect(b'\'')?;
        let value = match self.bump() {
            Some(b'\\') => self.escape()?,
            Some(b'\'' | b'\n') | None => {
                return Err(Error::Decode { offset: start, msg: "littéral caractère vide".into() })
            }
            Some(b) if b.is_ascii() => b,
            Some(_) => {
                return Err(Error::Decode {
                    offset: start,
                    msg: "caractère non ASCII dans un littéral (multi-octets)".into(),
                })
            }
        };
        if !self.eat(b'\'') {
            return Err(Error::Decode { offset: start, msg: "littéral caractère non terminé".into() });
        }
        Ok(value)
    }

    fn escape(&mut self) -> Result<u8> {
        let at = self.off;
        let b = self.bump().ok_or_else(|| self.error("échappement tronqué"))?;
        let v = match b {
            b'n' => b'\n',
            b't' => b'\t',
            b'r' => b'\r',
            b'a' => 0x07,
            b'b' => 0x08,
            b'f' => 0x0C,
            b'v' => 0x0B,
            b'\\' | b'\'' | b'"' | b'?' => b,
            b'0'..=b'7' => {
                let mut v = u32::from(b - b'0');
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ b'0'..=b'7') => {
                            v = v * 8 + u32::from(d - b'0');
                            self.off += 1;
                        }
                        _ => break,
                    }
                }
                u8::try_from(v).map_err(|_| Error::Decode { offset: at, msg: format!("octal {v:o} hors de 0..=255") })?
            }
            b'x' => {
                let mut v: u32 = 0;
                let mut n = 0usize;
                while let Some(d) = self.peek().and_then(|c| (c as char).to_digit(16)) {
                    v = v.saturating_mul(16).saturating_add(d);
                    self.off += 1;
                    n += 1;
                }
                if n == 0 {
                    return Err(Error::Decode { offset: at, msg: "\\x sans chiffres".into() });
                }
                u8::try_from(v).map_err(|_| Error::Decode { offset: at, msg: format!("\\x{v:X} hors de 0..=255") })?
            }
            other => {
                return Err(Error::Decode {
                    offset: at,
                    msg: format!("échappement inconnu `\\{}`", other as char),
                })
            }
        };
        Ok(v)
    }
}

/* ───────────────────────────── Tests ───────────────────────────── */
