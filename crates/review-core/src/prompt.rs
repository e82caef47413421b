//! Reviewer prompts

use shared_types::{Finding, IndicatorSet, Table};

use crate::chunk::Chunk;

/// System instruction for chat-style reviewers: role, checklist and the JSON
/// output contract that [`crate::parse_response`] understands.
pub const SYSTEM_PROMPT: &str = r#"你是一位极度严苛、一丝不苟的中文文字编校专家，专门审校控制性详细规划（控规）文件。

## 核心工作信条

你必须假设文件存在问题，而不是假设它是正确的。你的职责是主动寻找并暴露所有错误。
绝不允许以"该段无明显问题"为由跳过任何段落。

## 必查项目（每段都必须逐项核对）

### 【一】错别字
- 形近字误用：「以下」写成「一下」、「截至」与「截止」混用、「坐落」写成「座落」、「作为」写成「做为」、「己」/「已」/「巳」混用
- 音近字误用：「规划」写成「规化」、「相符」写成「相付」
- 多字/缺字造成语义不完整
- 专业术语错字：「容积率」「绿地率」「建筑密度」「用地性质」「控制性详细规划」等

### 【二】标点符号
- 中文语境中的英文逗号、句号（非小数点）、圆括号、分号应改为全角
- 省略号应为「……」

### 【三】数字与数据逻辑
- 分项合计与总数是否一致；注意「其中」是对同一总量的再拆分，「另有」是独立补充
- 同一指标（容积率/建筑密度/绿地率）在不同段落的数值是否矛盾
- 文中同时给出分子、分母和结果时须核算：容积率 = 总建筑面积 ÷ 用地面积；绿地率 = 绿地面积 ÷ 用地面积 × 100%；建筑密度 = 建筑基底面积 ÷ 用地面积 × 100%
- 规划期限起止年与目标年份是否匹配

### 【四】专业术语规范
- 「绿地率」而非「绿化率」；「建筑密度」而非「建蔽率」
- 义务教育设施仅含小学、初中（及学前教育），不包含高中
- 全文术语是否统一

### 【五】语法与表达
- 成分残缺、搭配不当、指代不明、前后矛盾、口语化表达

### 【六】排版规范
- 中文与英文缩写之间缺少空格：「是CBD」→「是 CBD」

## 输出格式（严格 JSON，不得附加任何解释性文字）

```json
{
  "summary": "一句话总结：本块主要问题类型和严重程度",
  "issues": [
    {
      "para_index": 5,
      "comment": "问题描述，说明错误原因并给出修改建议",
      "severity": "error",
      "matched": "原文中的具体问题片段（不超过20字）"
    }
  ]
}
```

severity 取值：error（必须修改）、warning（强烈建议修改）、suggestion（可考虑修改）。

- 每条 issue 必须有 matched 字段，指向原文具体片段
- para_index 使用文档摘录中给出的 [编号]；无法定位时填 -1
- 不得重复报告"机械规则已发现的问题"列表中已有的问题
"#;

/// Characters of a known issue's comment shown to the reviewer
const KNOWN_ISSUE_PREVIEW: usize = 60;
/// Characters of an indicator's context shown to the reviewer
const INDICATOR_CONTEXT_PREVIEW: usize = 40;

/// Limits applied while rendering one chunk prompt
#[derive(Debug, Clone, Copy)]
pub struct PromptLimits {
    pub excerpt_chars: usize,
    pub max_tables: usize,
    pub max_table_rows: usize,
    pub max_known_issues: usize,
    pub max_indicators_per_category: usize,
}

/// Everything a chunk prompt is rendered from
pub struct ChunkPrompt<'a> {
    pub chunk: &'a Chunk,
    /// 1-based position of the chunk
    pub position: usize,
    pub total: usize,
    /// Tables are only attached to the first chunk
    pub tables: &'a [Table],
    pub known_issues: &'a [Finding],
    pub indicators: &'a IndicatorSet,
    pub reference_rules: &'a str,
}

fn preview(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

impl ChunkPrompt<'_> {
    fn header(&self) -> String {
        let range = match self.chunk.index_range() {
            Some((first, last)) => format!("段落 [{}]~[{}]", first, last),
            None => "（空块）".to_string(),
        };
        let instruction = if self.position == self.total {
            "这是文档的最后一块。除检查本块问题外，请在 summary 字段提供整个文档的整体质量评估。"
        } else {
            "请仅检查本块段落内容，summary 字段描述本块主要问题。"
        };
        format!("【第 {}/{} 块，{}】\n{}\n", self.position, self.total, range, instruction)
    }

    fn excerpt(&self, limits: &PromptLimits) -> String {
        let mut lines = Vec::new();
        let mut used = 0;
        for para in &self.chunk.paragraphs {
            let line = format!("[{}] {}", para.index, para.text);
            let len = line.chars().count();
            if used + len > limits.excerpt_chars {
                lines.push(format!(
                    "... （已截断，共 {} 段）",
                    self.chunk.paragraphs.len()
                ));
                break;
            }
            lines.push(line);
            used += len;
        }

        if self.position == 1 {
            for (i, table) in self.tables.iter().take(limits.max_tables).enumerate() {
                lines.push(format!("\n[表格{}]", i));
                for row in table.rows.iter().take(limits.max_table_rows) {
                    lines.push(row.join(" | "));
                }
            }
        }
        lines.join("\n")
    }

    fn known_issues(&self, limits: &PromptLimits) -> String {
        let in_chunk = self.chunk.indices();
        let lines: Vec<String> = self
            .known_issues
            .iter()
            .filter(|f| in_chunk.contains(&f.paragraph_index))
            .take(limits.max_known_issues)
            .map(|f| {
                format!(
                    "- 第{}段：{}",
                    f.paragraph_index,
                    preview(&f.comment, KNOWN_ISSUE_PREVIEW)
                )
            })
            .collect();
        if lines.is_empty() {
            "（无）".to_string()
        } else {
            lines.join("\n")
        }
    }

    fn indicators(&self, limits: &PromptLimits) -> String {
        let mut lines = Vec::new();
        for (category, items) in self.indicators.categories() {
            for item in items.iter().take(limits.max_indicators_per_category) {
                let paragraph = item
                    .paragraph
                    .map_or_else(|| "?".to_string(), |p| p.to_string());
                lines.push(format!(
                    "- [{}] {}  （第{}段：{}）",
                    category.label(),
                    item.matched,
                    paragraph,
                    preview(&item.context, INDICATOR_CONTEXT_PREVIEW)
                ));
            }
        }
        if lines.is_empty() {
            "（未提取到）".to_string()
        } else {
            lines.join("\n")
        }
    }

    pub fn render(&self, limits: &PromptLimits) -> String {
        format!(
            r#"{header}
## 文件内容（段落格式：[编号] 正文）

{excerpt}

---

## 机械规则已发现的问题（请勿重复；同类问题若未出现在列表中，仍须报告）

以下仅为规则匹配结果，不代表检查已完成，错别字、标点、语法必须由你从头逐字扫描。

{known}

---

## 已提取数字指标（请重点核验逻辑一致性）

{indicators}

---

## 校对参考规则

{rules}

---

逐段检查上述文档内容，严格按 system 提示的六项要求输出所有问题。严格输出 JSON，不得附加任何其他文字。"#,
            header = self.header(),
            excerpt = self.excerpt(limits),
            known = self.known_issues(limits),
            indicators = self.indicators(limits),
            rules = self.reference_rules,
        )
    }
}
