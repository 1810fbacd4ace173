use crate::cfg::BlockId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuadId(pub u32);

impl QuadId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QuadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A virtual register. `R<n>` names locals and parameters, `T<n>` temporaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Register(pub String);

impl Register {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn param(index: usize) -> Self {
        Self(format!("R{}", index))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    Reg(Register),
    IConst(i32),
    Null,
    Symbol(String),
}

impl Operand {
    pub fn reg(name: impl Into<String>) -> Self {
        Operand::Reg(Register::new(name))
    }

    pub fn as_register(&self) -> Option<&Register> {
        match self {
            Operand::Reg(reg) => Some(reg),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Operand::Null)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(reg) => write!(f, "{}", reg),
            Operand::IConst(value) => write!(f, "{}", value),
            Operand::Null => f.write_str("null"),
            Operand::Symbol(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Cmp,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 11] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Rem,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
        BinaryOp::Shl,
        BinaryOp::Shr,
        BinaryOp::Cmp,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            BinaryOp::Add => "ADD",
            BinaryOp::Sub => "SUB",
            BinaryOp::Mul => "MUL",
            BinaryOp::Div => "DIV",
            BinaryOp::Rem => "REM",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Xor => "XOR",
            BinaryOp::Shl => "SHL",
            BinaryOp::Shr => "SHR",
            BinaryOp::Cmp => "CMP",
        }
    }

    pub fn from_mnemonic(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            UnaryOp::Neg => "NEG",
            UnaryOp::Not => "NOT",
        }
    }

    pub fn from_mnemonic(text: &str) -> Option<Self> {
        match text {
            "NEG" => Some(UnaryOp::Neg),
            "NOT" => Some(UnaryOp::Not),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Eq,
    Ne,
    Lt,
    Ge,
    Gt,
    Le,
}

impl Condition {
    pub const ALL: [Condition; 6] = [
        Condition::Eq,
        Condition::Ne,
        Condition::Lt,
        Condition::Ge,
        Condition::Gt,
        Condition::Le,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            Condition::Eq => "EQ",
            Condition::Ne => "NE",
            Condition::Lt => "LT",
            Condition::Ge => "GE",
            Condition::Gt => "GT",
            Condition::Le => "LE",
        }
    }

    pub fn from_suffix(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cond| cond.suffix() == text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Move {
        dest: Register,
        src: Operand,
    },
    Binary {
        op: BinaryOp,
        dest: Register,
        left: Operand,
        right: Operand,
    },
    Unary {
        op: UnaryOp,
        dest: Register,
        src: Operand,
    },
    /// Throws when `src` is null. The optional guard register carries the check result.
    NullCheck {
        guard: Option<Register>,
        src: Operand,
    },
    New {
        dest: Register,
        class: String,
    },
    NewArray {
        dest: Register,
        size: Operand,
    },
    ALoad {
        dest: Register,
        array: Operand,
        index: Operand,
    },
    AStore {
        array: Operand,
        index: Operand,
        value: Operand,
    },
    ALength {
        dest: Register,
        array: Operand,
    },
    GetField {
        dest: Register,
        object: Operand,
        field: String,
    },
    PutField {
        object: Operand,
        field: String,
        value: Operand,
    },
    GetStatic {
        dest: Register,
        field: String,
    },
    PutStatic {
        field: String,
        value: Operand,
    },
    InstanceOf {
        dest: Register,
        src: Operand,
        class: String,
    },
    CheckCast {
        dest: Register,
        src: Operand,
        class: String,
    },
    Invoke {
        dest: Option<Register>,
        method: String,
        args: Vec<Operand>,
    },
    IfCmp {
        cond: Condition,
        left: Operand,
        right: Operand,
        target: BlockId,
    },
    Goto {
        target: BlockId,
    },
    Return {
        value: Option<Operand>,
    },
    Nop,
}

impl Operator {
    pub fn defined_registers(&self) -> Vec<&Register> {
        match self {
            Operator::Move { dest, .. }
            | Operator::Binary { dest, .. }
            | Operator::Unary { dest, .. }
            | Operator::New { dest, .. }
            | Operator::NewArray { dest, .. }
            | Operator::ALoad { dest, .. }
            | Operator::ALength { dest, .. }
            | Operator::GetField { dest, .. }
            | Operator::GetStatic { dest, .. }
            | Operator::InstanceOf { dest, .. }
            | Operator::CheckCast { dest, .. } => vec![dest],
            Operator::NullCheck { guard, .. } => guard.iter().collect(),
            Operator::Invoke { dest, .. } => dest.iter().collect(),
            Operator::AStore { .. }
            | Operator::PutField { .. }
            | Operator::PutStatic { .. }
            | Operator::IfCmp { .. }
            | Operator::Goto { .. }
            | Operator::Return { .. }
            | Operator::Nop => Vec::new(),
        }
    }

    /// Value operands read by the operator, in textual order.
    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            Operator::Move { src, .. }
            | Operator::Unary { src, .. }
            | Operator::NullCheck { src, .. }
            | Operator::InstanceOf { src, .. }
            | Operator::CheckCast { src, .. } => vec![src],
            Operator::Binary { left, right, .. } | Operator::IfCmp { left, right, .. } => {
                vec![left, right]
            }
            Operator::NewArray { size, .. } => vec![size],
            Operator::ALoad { array, index, .. } => vec![array, index],
            Operator::AStore {
                array,
                index,
                value,
            } => vec![array, index, value],
            Operator::ALength { array, .. } => vec![array],
            Operator::GetField { object, .. } => vec![object],
            Operator::PutField { object, value, .. } => vec![object, value],
            Operator::PutStatic { value, .. } => vec![value],
            Operator::Invoke { args, .. } => args.iter().collect(),
            Operator::Return { value } => value.iter().collect(),
            Operator::New { .. }
            | Operator::GetStatic { .. }
            | Operator::Goto { .. }
            | Operator::Nop => Vec::new(),
        }
    }

    pub fn used_registers(&self) -> Vec<&Register> {
        self.operands()
            .into_iter()
            .filter_map(Operand::as_register)
            .collect()
    }

    /// Whether the operator does anything besides writing its defined registers.
    pub fn has_side_effects(&self) -> bool {
        matches!(
            self,
            Operator::NullCheck { .. }
                | Operator::AStore { .. }
                | Operator::PutField { .. }
                | Operator::PutStatic { .. }
                | Operator::CheckCast { .. }
                | Operator::Invoke { .. }
                | Operator::IfCmp { .. }
                | Operator::Goto { .. }
                | Operator::Return { .. }
        )
    }

    pub fn is_branch(&self) -> bool {
        matches!(
            self,
            Operator::IfCmp { .. } | Operator::Goto { .. } | Operator::Return { .. }
        )
    }

    pub fn mnemonic(&self) -> String {
        match self {
            Operator::Move { .. } => "MOVE".to_string(),
            Operator::Binary { op, .. } => op.mnemonic().to_string(),
            Operator::Unary { op, .. } => op.mnemonic().to_string(),
            Operator::NullCheck { .. } => "NULL_CHECK".to_string(),
            Operator::New { .. } => "NEW".to_string(),
            Operator::NewArray { .. } => "NEWARRAY".to_string(),
            Operator::ALoad { .. } => "ALOAD".to_string(),
            Operator::AStore { .. } => "ASTORE".to_string(),
            Operator::ALength { .. } => "ALENGTH".to_string(),
            Operator::GetField { .. } => "GETFIELD".to_string(),
            Operator::PutField { .. } => "PUTFIELD".to_string(),
            Operator::GetStatic { .. } => "GETSTATIC".to_string(),
            Operator::PutStatic { .. } => "PUTSTATIC".to_string(),
            Operator::InstanceOf { .. } => "INSTANCEOF".to_string(),
            Operator::CheckCast { .. } => "CHECKCAST".to_string(),
            Operator::Invoke { .. } => "INVOKE".to_string(),
            Operator::IfCmp { cond, .. } => format!("IFCMP_{}", cond.suffix()),
            Operator::Goto { .. } => "GOTO".to_string(),
            Operator::Return { .. } => "RETURN".to_string(),
            Operator::Nop => "NOP".to_string(),
        }
    }

    fn display_args(&self) -> Vec<String> {
        let sym = |s: &String| s.clone();
        match self {
            Operator::Move { dest, src } => vec![dest.to_string(), src.to_string()],
            Operator::Binary {
                dest, left, right, ..
            } => vec![dest.to_string(), left.to_string(), right.to_string()],
            Operator::Unary { dest, src, .. } => vec![dest.to_string(), src.to_string()],
            Operator::NullCheck { guard, src } => guard
                .iter()
                .map(ToString::to_string)
                .chain(std::iter::once(src.to_string()))
                .collect(),
            Operator::New { dest, class } => vec![dest.to_string(), sym(class)],
            Operator::NewArray { dest, size } => vec![dest.to_string(), size.to_string()],
            Operator::ALoad { dest, array, index } => {
                vec![dest.to_string(), array.to_string(), index.to_string()]
            }
            Operator::AStore {
                array,
                index,
                value,
            } => vec![array.to_string(), index.to_string(), value.to_string()],
            Operator::ALength { dest, array } => vec![dest.to_string(), array.to_string()],
            Operator::GetField {
                dest,
                object,
                field,
            } => vec![dest.to_string(), object.to_string(), sym(field)],
            Operator::PutField {
                object,
                field,
                value,
            } => vec![object.to_string(), sym(field), value.to_string()],
            Operator::GetStatic { dest, field } => vec![dest.to_string(), sym(field)],
            Operator::PutStatic { field, value } => vec![sym(field), value.to_string()],
            Operator::InstanceOf { dest, src, class }
            | Operator::CheckCast { dest, src, class } => {
                vec![dest.to_string(), src.to_string(), sym(class)]
            }
            Operator::Invoke { dest, method, args } => {
                let mut parts = vec![dest
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "void".to_string())];
                parts.push(method.clone());
                parts.extend(args.iter().map(ToString::to_string));
                parts
            }
            Operator::IfCmp {
                left,
                right,
                target,
                ..
            } => vec![left.to_string(), right.to_string(), target.to_string()],
            Operator::Goto { target } => vec![target.to_string()],
            Operator::Return { value } => value.iter().map(ToString::to_string).collect(),
            Operator::Nop => Vec::new(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self.display_args();
        if args.is_empty() {
            write!(f, "{}", self.mnemonic())
        } else {
            write!(f, "{} {}", self.mnemonic(), args.join(", "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quad {
    pub id: QuadId,
    pub operator: Operator,
}

impl Quad {
    pub fn new(id: u32, operator: Operator) -> Self {
        Self {
            id: QuadId(id),
            operator,
        }
    }

    pub fn defined_registers(&self) -> Vec<&Register> {
        self.operator.defined_registers()
    }

    pub fn used_registers(&self) -> Vec<&Register> {
        self.operator.used_registers()
    }

    pub fn has_side_effects(&self) -> bool {
        self.operator.has_side_effects()
    }

    pub fn mov(id: u32, dest: &str, src: Operand) -> Self {
        Self::new(
            id,
            Operator::Move {
                dest: Register::new(dest),
                src,
            },
        )
    }

    pub fn binary(id: u32, op: BinaryOp, dest: &str, left: Operand, right: Operand) -> Self {
        Self::new(
            id,
            Operator::Binary {
                op,
                dest: Register::new(dest),
                left,
                right,
            },
        )
    }

    pub fn null_check(id: u32, src: &str) -> Self {
        Self::new(
            id,
            Operator::NullCheck {
                guard: None,
                src: Operand::reg(src),
            },
        )
    }

    pub fn ret(id: u32, value: Option<Operand>) -> Self {
        Self::new(id, Operator::Return { value })
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.operator)
    }
}
