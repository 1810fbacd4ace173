use crate::{ParseError, Rule};
use pest::iterators::Pair;
use quadflow_core::{
    BinaryOp, BlockId, Condition, ControlFlowGraph, FlowError, MethodInfo, Operand, Operator,
    Quad, Register, UnaryOp,
};
use std::collections::HashSet;
use std::ops::RangeInclusive;

struct BlockSource<'i> {
    id: BlockId,
    successors: Vec<Pair<'i, Rule>>,
    quads: Vec<Pair<'i, Rule>>,
}

fn line_of(pair: &Pair<'_, Rule>) -> usize {
    pair.as_span().start_pos().line_col().0
}

fn parse_number<T: std::str::FromStr>(pair: &Pair<'_, Rule>) -> Result<T, ParseError> {
    pair.as_str().parse().map_err(|_| ParseError::InvalidNumber {
        line: line_of(pair),
        text: pair.as_str().to_string(),
    })
}

fn block_id(pair: &Pair<'_, Rule>) -> Result<BlockId, ParseError> {
    match pair.as_str() {
        "entry" => Ok(BlockId::ENTRY),
        "exit" => Ok(BlockId::EXIT),
        text => text
            .strip_prefix("bb")
            .and_then(|n| n.parse().ok())
            .map(BlockId)
            .ok_or_else(|| ParseError::InvalidNumber {
                line: line_of(pair),
                text: text.to_string(),
            }),
    }
}

pub(crate) fn lower_method(pair: Pair<'_, Rule>) -> Result<ControlFlowGraph, ParseError> {
    let mut name = String::new();
    let mut param_count = 0;
    let mut is_static = false;
    let mut blocks = Vec::new();

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::method_name => name = part.as_str().to_string(),
            Rule::param_count => param_count = parse_number(&part)?,
            Rule::static_flag => is_static = true,
            Rule::block => blocks.push(part),
            _ => {}
        }
    }

    let method = MethodInfo::new(name.clone(), param_count).with_static(is_static);
    let mut cfg = ControlFlowGraph::new(method);
    let mut sources = Vec::new();
    let mut seen = HashSet::new();
    for block in blocks {
        let mut source = BlockSource {
            id: BlockId::ENTRY,
            successors: Vec::new(),
            quads: Vec::new(),
        };
        for part in block.into_inner() {
            match part.as_rule() {
                Rule::block_name => {
                    source.id = block_id(&part)?;
                    if !seen.insert(source.id) {
                        return Err(ParseError::DuplicateBlock {
                            method: name.clone(),
                            block: part.as_str().to_string(),
                        });
                    }
                    if !source.id.is_pseudo() {
                        cfg.insert_block(source.id).map_err(in_method(&name))?;
                    }
                }
                Rule::successors => source.successors.extend(part.into_inner()),
                Rule::quad => source.quads.push(part),
                _ => {}
            }
        }
        sources.push(source);
    }

    for source in &sources {
        for succ in &source.successors {
            let target = declared(&cfg, &name, succ)?;
            cfg.add_edge(source.id, target).map_err(in_method(&name))?;
        }
    }

    for source in sources {
        for pair in source.quads {
            let quad = lower_quad(&cfg, &name, pair)?;
            if cfg.quad(quad.id).is_some() {
                return Err(ParseError::DuplicateQuad {
                    method: name.clone(),
                    id: quad.id.0,
                });
            }
            if matches!(quad.operator, Operator::IfCmp { .. }) && source.successors.is_empty() {
                return Err(ParseError::MissingFallthrough {
                    method: name.clone(),
                    block: source.id.to_string(),
                });
            }
            if let Operator::IfCmp { target, .. } | Operator::Goto { target } = &quad.operator {
                cfg.add_edge(source.id, *target).map_err(in_method(&name))?;
            }
            cfg.push_quad(source.id, quad).map_err(in_method(&name))?;
        }
    }

    Ok(cfg)
}

fn in_method(method: &str) -> impl FnOnce(FlowError) -> ParseError {
    let method = method.to_string();
    move |source| ParseError::Graph { method, source }
}

fn declared(
    cfg: &ControlFlowGraph,
    method: &str,
    pair: &Pair<'_, Rule>,
) -> Result<BlockId, ParseError> {
    let id = block_id(pair)?;
    if cfg.contains_block(id) {
        Ok(id)
    } else {
        Err(ParseError::UnknownBlock {
            method: method.to_string(),
            block: pair.as_str().to_string(),
        })
    }
}

enum Arg<'i> {
    Reg(&'i str),
    Int(i32),
    Null,
    Block(BlockId),
    Symbol(&'i str),
}

struct Args<'i> {
    opcode: &'i str,
    line: usize,
    items: Vec<Arg<'i>>,
}

impl<'i> Args<'i> {
    fn bad(&self, message: impl Into<String>) -> ParseError {
        ParseError::BadOperands {
            line: self.line,
            opcode: self.opcode.to_string(),
            message: message.into(),
        }
    }

    fn expect(&self, count: RangeInclusive<usize>) -> Result<(), ParseError> {
        if count.contains(&self.items.len()) {
            return Ok(());
        }
        let wanted = if count.start() == count.end() {
            count.start().to_string()
        } else if *count.end() == usize::MAX {
            format!("at least {}", count.start())
        } else {
            format!("{} to {}", count.start(), count.end())
        };
        Err(self.bad(format!(
            "takes {} operands, found {}",
            wanted,
            self.items.len()
        )))
    }

    fn register(&self, i: usize) -> Result<Register, ParseError> {
        match self.items.get(i) {
            Some(Arg::Reg(name)) => Ok(Register::new(*name)),
            _ => Err(self.bad(format!("operand {} must be a register", i + 1))),
        }
    }

    fn value(&self, i: usize) -> Result<Operand, ParseError> {
        match self.items.get(i) {
            Some(Arg::Reg(name)) => Ok(Operand::reg(*name)),
            Some(Arg::Int(value)) => Ok(Operand::IConst(*value)),
            Some(Arg::Null) => Ok(Operand::Null),
            _ => Err(self.bad(format!(
                "operand {} must be a register, integer or null",
                i + 1
            ))),
        }
    }

    fn symbol(&self, i: usize) -> Result<String, ParseError> {
        match self.items.get(i) {
            Some(Arg::Symbol(name)) => Ok(name.to_string()),
            _ => Err(self.bad(format!("operand {} must be a name", i + 1))),
        }
    }

    fn target(&self, i: usize) -> Result<BlockId, ParseError> {
        match self.items.get(i) {
            Some(Arg::Block(BlockId::ENTRY)) => Err(self.bad("cannot jump to entry")),
            Some(Arg::Block(id)) => Ok(*id),
            _ => Err(self.bad(format!("operand {} must be a block", i + 1))),
        }
    }
}

fn lower_quad(
    cfg: &ControlFlowGraph,
    method: &str,
    pair: Pair<'_, Rule>,
) -> Result<Quad, ParseError> {
    let line = line_of(&pair);
    let mut id = 0;
    let mut opcode = "";
    let mut items = Vec::new();

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::quad_id => id = parse_number(&part)?,
            Rule::opcode => opcode = part.as_str(),
            Rule::register => items.push(Arg::Reg(part.as_str())),
            Rule::integer => items.push(Arg::Int(parse_number(&part)?)),
            Rule::null => items.push(Arg::Null),
            Rule::block_name => items.push(Arg::Block(declared(cfg, method, &part)?)),
            Rule::symbol => items.push(Arg::Symbol(part.as_str())),
            _ => {}
        }
    }

    let args = Args {
        opcode,
        line,
        items,
    };
    Ok(Quad::new(id, build_operator(&args)?))
}

fn build_operator(args: &Args<'_>) -> Result<Operator, ParseError> {
    let opcode = args.opcode;

    if let Some(op) = BinaryOp::from_mnemonic(opcode) {
        args.expect(3..=3)?;
        return Ok(Operator::Binary {
            op,
            dest: args.register(0)?,
            left: args.value(1)?,
            right: args.value(2)?,
        });
    }
    if let Some(op) = UnaryOp::from_mnemonic(opcode) {
        args.expect(2..=2)?;
        return Ok(Operator::Unary {
            op,
            dest: args.register(0)?,
            src: args.value(1)?,
        });
    }
    if let Some(cond) = opcode
        .strip_prefix("IFCMP_")
        .and_then(Condition::from_suffix)
    {
        args.expect(3..=3)?;
        return Ok(Operator::IfCmp {
            cond,
            left: args.value(0)?,
            right: args.value(1)?,
            target: args.target(2)?,
        });
    }

    let operator = match opcode {
        "MOVE" => {
            args.expect(2..=2)?;
            Operator::Move {
                dest: args.register(0)?,
                src: args.value(1)?,
            }
        }
        "NULL_CHECK" => {
            args.expect(1..=2)?;
            if args.items.len() == 2 {
                Operator::NullCheck {
                    guard: Some(args.register(0)?),
                    src: args.value(1)?,
                }
            } else {
                Operator::NullCheck {
                    guard: None,
                    src: args.value(0)?,
                }
            }
        }
        "NEW" => {
            args.expect(2..=2)?;
            Operator::New {
                dest: args.register(0)?,
                class: args.symbol(1)?,
            }
        }
        "NEWARRAY" => {
            args.expect(2..=2)?;
            Operator::NewArray {
                dest: args.register(0)?,
                size: args.value(1)?,
            }
        }
        "ALOAD" => {
            args.expect(3..=3)?;
            Operator::ALoad {
                dest: args.register(0)?,
                array: args.value(1)?,
                index: args.value(2)?,
            }
        }
        "ASTORE" => {
            args.expect(3..=3)?;
            Operator::AStore {
                array: args.value(0)?,
                index: args.value(1)?,
                value: args.value(2)?,
            }
        }
        "ALENGTH" => {
            args.expect(2..=2)?;
            Operator::ALength {
                dest: args.register(0)?,
                array: args.value(1)?,
            }
        }
        "GETFIELD" => {
            args.expect(3..=3)?;
            Operator::GetField {
                dest: args.register(0)?,
                object: args.value(1)?,
                field: args.symbol(2)?,
            }
        }
        "PUTFIELD" => {
            args.expect(3..=3)?;
            Operator::PutField {
                object: args.value(0)?,
                field: args.symbol(1)?,
                value: args.value(2)?,
            }
        }
        "GETSTATIC" => {
            args.expect(2..=2)?;
            Operator::GetStatic {
                dest: args.register(0)?,
                field: args.symbol(1)?,
            }
        }
        "PUTSTATIC" => {
            args.expect(2..=2)?;
            Operator::PutStatic {
                field: args.symbol(0)?,
                value: args.value(1)?,
            }
        }
        "INSTANCEOF" => {
            args.expect(3..=3)?;
            Operator::InstanceOf {
                dest: args.register(0)?,
                src: args.value(1)?,
                class: args.symbol(2)?,
            }
        }
        "CHECKCAST" => {
            args.expect(3..=3)?;
            Operator::CheckCast {
                dest: args.register(0)?,
                src: args.value(1)?,
                class: args.symbol(2)?,
            }
        }
        "INVOKE" => {
            args.expect(2..=usize::MAX)?;
            let dest = match args.items.first() {
                Some(Arg::Symbol("void")) => None,
                _ => Some(args.register(0)?),
            };
            Operator::Invoke {
                dest,
                method: args.symbol(1)?,
                args: (2..args.items.len())
                    .map(|i| args.value(i))
                    .collect::<Result<_, _>>()?,
            }
        }
        "GOTO" => {
            args.expect(1..=1)?;
            Operator::Goto {
                target: args.target(0)?,
            }
        }
        "RETURN" => {
            args.expect(0..=1)?;
            Operator::Return {
                value: if args.items.is_empty() {
                    None
                } else {
                    Some(args.value(0)?)
                },
            }
        }
        "NOP" => {
            args.expect(0..=0)?;
            Operator::Nop
        }
        _ => {
            return Err(ParseError::UnknownOpcode {
                line: args.line,
                opcode: opcode.to_string(),
            })
        }
    };
    Ok(operator)
}
