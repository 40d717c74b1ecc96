//! Generates a string matching a (restricted) regular expression.
//!
//! The original generates regex-matching strings via `exrex`; no equivalent crate exists in
//! this corpus, so this is a small hand-rolled interpreter covering what CHECK-constraint
//! regex hints realistically contain: literals, character classes, `\d`/`\w`/`\s`, grouping,
//! alternation, and the `* + ? {n} {n,m}` quantifiers. Anything it cannot parse falls back to
//! a literal echo of the pattern body with the regex metacharacters stripped.

use rand::Rng;
use rand::rngs::StdRng;

pub fn generate_matching(pattern: &str, rng: &mut StdRng) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut parser = Parser { chars: &chars, pos: 0 };
    match parser.parse_alternation() {
        Some(node) if parser.pos >= chars.len() => render(&node, rng),
        _ => fallback_literal(pattern),
    }
}

fn fallback_literal(pattern: &str) -> String {
    pattern.chars().filter(|c| !"^$.*+?()[]{}|\\".contains(*c)).collect()
}

#[derive(Debug, Clone)]
enum Node {
    Literal(char),
    AnyClass(Vec<ClassItem>, bool), // items, negated
    Seq(Vec<Node>),
    Alt(Vec<Node>),
    Repeat(Box<Node>, usize, usize),
}

#[derive(Debug, Clone)]
enum ClassItem {
    Char(char),
    Range(char, char),
}

struct Parser<'a> {
    chars: &'a [char],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn parse_alternation(&mut self) -> Option<Node> {
        let mut branches = vec![self.parse_seq()?];
        while self.peek() == Some('|') {
            self.advance();
            branches.push(self.parse_seq()?);
        }
        if branches.len() == 1 {
            Some(branches.pop().unwrap())
        } else {
            Some(Node::Alt(branches))
        }
    }

    fn parse_seq(&mut self) -> Option<Node> {
        let mut items = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            let atom = self.parse_atom()?;
            let item = self.parse_quantifier(atom);
            items.push(item);
        }
        Some(Node::Seq(items))
    }

    fn parse_quantifier(&mut self, node: Node) -> Node {
        match self.peek() {
            Some('*') => {
                self.advance();
                Node::Repeat(Box::new(node), 0, 3)
            }
            Some('+') => {
                self.advance();
                Node::Repeat(Box::new(node), 1, 3)
            }
            Some('?') => {
                self.advance();
                Node::Repeat(Box::new(node), 0, 1)
            }
            Some('{') => {
                let start = self.pos;
                self.advance();
                let mut spec = String::new();
                while let Some(c) = self.peek() {
                    if c == '}' {
                        break;
                    }
                    spec.push(c);
                    self.advance();
                }
                if self.peek() == Some('}') {
                    self.advance();
                    if let Some((lo, hi)) = parse_bounds(&spec) {
                        return Node::Repeat(Box::new(node), lo, hi);
                    }
                }
                self.pos = start;
                node
            }
            _ => node,
        }
    }

    fn parse_atom(&mut self) -> Option<Node> {
        match self.advance()? {
            '(' => {
                // strip non-capturing / named-group prefixes the same as a plain group
                if self.peek() == Some('?') {
                    while let Some(c) = self.peek() {
                        self.advance();
                        if c == ':' || c == '>' {
                            break;
                        }
                    }
                }
                let inner = self.parse_alternation()?;
                if self.peek() == Some(')') {
                    self.advance();
                }
                Some(inner)
            }
            '[' => self.parse_class(),
            '\\' => {
                let esc = self.advance()?;
                Some(match esc {
                    'd' => Node::AnyClass(vec![ClassItem::Range('0', '9')], false),
                    'w' => Node::AnyClass(
                        vec![ClassItem::Range('a', 'z'), ClassItem::Range('A', 'Z'), ClassItem::Range('0', '9'), ClassItem::Char('_')],
                        false,
                    ),
                    's' => Node::Literal(' '),
                    other => Node::Literal(other),
                })
            }
            '.' => Some(Node::AnyClass(vec![ClassItem::Range('a', 'z')], false)),
            '^' | '$' => self.parse_atom().or(Some(Node::Seq(Vec::new()))),
            c => Some(Node::Literal(c)),
        }
    }

    fn parse_class(&mut self) -> Option<Node> {
        let negated = if self.peek() == Some('^') {
            self.advance();
            true
        } else {
            false
        };
        let mut items = Vec::new();
        while let Some(c) = self.peek() {
            if c == ']' {
                break;
            }
            self.advance();
            if self.peek() == Some('-') && self.chars.get(self.pos + 1).is_some_and(|&n| n != ']') {
                self.advance();
                let hi = self.advance()?;
                items.push(ClassItem::Range(c, hi));
            } else {
                items.push(ClassItem::Char(c));
            }
        }
        if self.peek() == Some(']') {
            self.advance();
        }
        Some(Node::AnyClass(items, negated))
    }
}

fn parse_bounds(spec: &str) -> Option<(usize, usize)> {
    if let Some((lo, hi)) = spec.split_once(',') {
        let lo: usize = lo.trim().parse().ok()?;
        let hi: usize = if hi.trim().is_empty() { lo + 3 } else { hi.trim().parse().ok()? };
        Some((lo, hi))
    } else {
        let n: usize = spec.trim().parse().ok()?;
        Some((n, n))
    }
}

fn render(node: &Node, rng: &mut StdRng) -> String {
    match node {
        Node::Literal(c) => c.to_string(),
        Node::AnyClass(items, negated) => render_class(items, *negated, rng),
        Node::Seq(items) => items.iter().map(|n| render(n, rng)).collect(),
        Node::Alt(branches) => {
            let idx = rng.gen_range(0..branches.len());
            render(&branches[idx], rng)
        }
        Node::Repeat(inner, lo, hi) => {
            let n = if hi > lo { rng.gen_range(*lo..=*hi) } else { *lo };
            (0..n).map(|_| render(inner, rng)).collect()
        }
    }
}

fn render_class(items: &[ClassItem], negated: bool, rng: &mut StdRng) -> String {
    if negated || items.is_empty() {
        let pool: Vec<char> = ('a'..='z').collect();
        return pool[rng.gen_range(0..pool.len())].to_string();
    }
    let idx = rng.gen_range(0..items.len());
    match items[idx] {
        ClassItem::Char(c) => c.to_string(),
        ClassItem::Range(lo, hi) => {
            let lo = lo as u32;
            let hi = hi as u32;
            let pick = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
            char::from_u32(pick).unwrap_or('a').to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn generates_digit_sequence() {
        let mut rng = StdRng::seed_from_u64(7);
        let s = generate_matching(r"\d{3}-\d{4}", &mut rng);
        assert_eq!(s.len(), 8);
        assert_eq!(&s[3..4], "-");
        assert!(s.chars().enumerate().all(|(i, c)| i == 3 || c.is_ascii_digit()));
    }

    #[test]
    fn generates_from_character_class() {
        let mut rng = StdRng::seed_from_u64(3);
        let s = generate_matching("[a-c]+", &mut rng);
        assert!(!s.is_empty());
        assert!(s.chars().all(|c| ('a'..='c').contains(&c)));
    }

    #[test]
    fn falls_back_on_unparseable_pattern() {
        let mut rng = StdRng::seed_from_u64(1);
        let s = generate_matching("abc", &mut rng);
        assert_eq!(s, "abc");
    }
}
