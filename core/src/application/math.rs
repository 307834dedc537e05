// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Arithmetic answers for utterances such as "what is 7 times 6?".
//!
//! Picks the longest `number (operator number)+` run out of the utterance.
//! Numbers are decimal literals or English number words up to ninety-nine;
//! operators are symbols or words (`plus`, `minus`, `times`,
//! `multiplied by`, `divided by`, `over`). Multiplication and division bind
//! tighter than addition and subtraction.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Symbol {
    Number(f64),
    Op(Operator),
    /// Anything that cannot be part of an expression
    Break,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MathAnswer {
    /// Expression rendered with digits and symbols, e.g. `2 + 3`
    pub expression: String,
    pub value: f64,
}

impl MathAnswer {
    /// `"<expression> = <value>"`
    pub fn response(&self) -> String {
        format!("{} = {}", self.expression, format_number(self.value))
    }
}

/// Stateless arithmetic evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct MathematicalEvaluation;

impl MathematicalEvaluation {
    pub fn new() -> Self {
        Self
    }

    /// `None` when the utterance holds no complete expression or the
    /// expression cannot be evaluated (division by zero).
    pub fn evaluate(&self, query: &str) -> Option<MathAnswer> {
        let symbols = symbolize(&lex(&query.to_lowercase()));
        let (numbers, operators) = longest_expression(&symbols)?;
        let value = evaluate(&numbers, &operators)?;

        let mut expression = format_number(numbers[0]);
        for (op, number) in operators.iter().zip(numbers.iter().skip(1)) {
            expression.push_str(&format!(" {} {}", op.symbol(), format_number(*number)));
        }

        Some(MathAnswer { expression, value })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Lexeme {
    Literal(String),
    Word(String),
    Op(Operator),
}

fn lex(text: &str) -> Vec<Lexeme> {
    let chars: Vec<char> = text.chars().collect();
    let mut lexemes = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let literal: String = chars[start..i].iter().collect();
            lexemes.push(Lexeme::Literal(literal.trim_end_matches('.').to_string()));
            continue;
        }
        if c.is_alphabetic() {
            let start = i;
            while i < chars.len() && (chars[i].is_alphabetic() || chars[i] == '\'') {
                i += 1;
            }
            lexemes.push(Lexeme::Word(chars[start..i].iter().collect()));
            continue;
        }
        match c {
            '+' => lexemes.push(Lexeme::Op(Operator::Add)),
            '-' | '−' => lexemes.push(Lexeme::Op(Operator::Sub)),
            '*' | '×' => lexemes.push(Lexeme::Op(Operator::Mul)),
            '/' | '÷' => lexemes.push(Lexeme::Op(Operator::Div)),
            _ => {}
        }
        i += 1;
    }

    lexemes
}

fn unit_word(word: &str) -> Option<f64> {
    let value = match word {
        "zero" => 0,
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        _ => return None,
    };
    Some(value as f64)
}

fn tens_word(word: &str) -> Option<f64> {
    let value = match word {
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        _ => return None,
    };
    Some(value as f64)
}

fn operator_word(word: &str) -> Option<Operator> {
    match word {
        "plus" => Some(Operator::Add),
        "minus" => Some(Operator::Sub),
        "times" | "multiplied" => Some(Operator::Mul),
        "divided" | "over" => Some(Operator::Div),
        _ => None,
    }
}

fn symbolize(lexemes: &[Lexeme]) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    let mut i = 0;

    while i < lexemes.len() {
        match &lexemes[i] {
            Lexeme::Literal(literal) => symbols.push(
                literal
                    .parse::<f64>()
                    .map(Symbol::Number)
                    .unwrap_or(Symbol::Break),
            ),
            Lexeme::Op(op) => symbols.push(Symbol::Op(*op)),
            Lexeme::Word(word) => {
                if let Some(tens) = tens_word(word) {
                    // "twenty one" -> 21
                    let unit = match lexemes.get(i + 1) {
                        Some(Lexeme::Word(next)) => unit_word(next).filter(|u| (1.0..10.0).contains(u)),
                        _ => None,
                    };
                    if let Some(unit) = unit {
                        i += 1;
                        symbols.push(Symbol::Number(tens + unit));
                    } else {
                        symbols.push(Symbol::Number(tens));
                    }
                } else if let Some(unit) = unit_word(word) {
                    symbols.push(Symbol::Number(unit));
                } else if let Some(op) = operator_word(word) {
                    symbols.push(Symbol::Op(op));
                } else if word != "by" {
                    symbols.push(Symbol::Break);
                }
            }
        }
        i += 1;
    }

    symbols
}

/// Longest `number (op number)+` run; earliest wins among equals
fn longest_expression(symbols: &[Symbol]) -> Option<(Vec<f64>, Vec<Operator>)> {
    let mut best: Option<(Vec<f64>, Vec<Operator>)> = None;

    for start in 0..symbols.len() {
        let Symbol::Number(first) = symbols[start] else {
            continue;
        };
        let mut numbers = vec![first];
        let mut operators = Vec::new();
        let mut j = start;

        while let (Some(Symbol::Op(op)), Some(Symbol::Number(n))) =
            (symbols.get(j + 1), symbols.get(j + 2))
        {
            operators.push(*op);
            numbers.push(*n);
            j += 2;
        }

        let longer = best
            .as_ref()
            .map(|(_, ops)| operators.len() > ops.len())
            .unwrap_or(true);
        if !operators.is_empty() && longer {
            best = Some((numbers, operators));
        }
    }

    best
}

fn evaluate(numbers: &[f64], operators: &[Operator]) -> Option<f64> {
    // Collapse * and / into terms, then add the terms up
    let mut terms = vec![*numbers.first()?];
    let mut signs = Vec::new();

    for (op, &number) in operators.iter().zip(numbers.iter().skip(1)) {
        match op {
            Operator::Mul => *terms.last_mut()? *= number,
            Operator::Div => {
                if number == 0.0 {
                    return None;
                }
                *terms.last_mut()? /= number;
            }
            Operator::Add | Operator::Sub => {
                signs.push(*op);
                terms.push(number);
            }
        }
    }

    let mut total = terms[0];
    for (sign, term) in signs.iter().zip(terms.iter().skip(1)) {
        match sign {
            Operator::Sub => total -= term,
            _ => total += term,
        }
    }

    total.is_finite().then_some(total)
}

fn format_number(value: f64) -> String {
    let rounded = (value * 1_000_000.0).round() / 1_000_000.0;
    if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}
